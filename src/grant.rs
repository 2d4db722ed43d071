//! Grant handlers and the capabilities they share.
//!
//! [`GrantBase`] bundles what every grant type needs: scope validation through the model,
//! access/refresh token generation, and expiry computation from configured lifetimes.
//! Concrete handlers such as [`AuthorizationCodeGrant`] hold a `GrantBase` by composition and
//! implement only their own exchange state machine.

pub mod authorization_code;

pub use authorization_code::AuthorizationCodeGrant;

// self
use crate::{
	_prelude::*,
	auth::{ScopeSet, TokenSecret},
	config::GrantConfig,
	model::{ModelError, TokenModel},
};

/// OAuth 2.0 grant types implemented by the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum GrantType {
	/// Authorization Code grant (RFC 6749 §4.1).
	AuthorizationCode,
}
impl GrantType {
	/// Returns the RFC 6749 `grant_type` identifier.
	pub const fn as_str(self) -> &'static str {
		match self {
			GrantType::AuthorizationCode => "authorization_code",
		}
	}
}
impl Display for GrantType {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Time source used for expiry checks and computations.
pub trait Clock
where
	Self: Debug + Send + Sync,
{
	/// Current UTC instant.
	fn now(&self) -> OffsetDateTime;
}

/// [`Clock`] backed by the system wall clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;
impl Clock for SystemClock {
	fn now(&self) -> OffsetDateTime {
		OffsetDateTime::now_utc()
	}
}

/// Manually driven [`Clock`] for deterministic tests and replays.
#[derive(Debug)]
pub struct FixedClock(RwLock<OffsetDateTime>);
impl FixedClock {
	/// Creates a clock frozen at `instant`.
	pub fn new(instant: OffsetDateTime) -> Self {
		Self(RwLock::new(instant))
	}

	/// Moves the clock to `instant`.
	pub fn set(&self, instant: OffsetDateTime) {
		*self.0.write() = instant;
	}

	/// Moves the clock forward by `delta`.
	pub fn advance(&self, delta: Duration) {
		let mut now = self.0.write();

		*now += delta;
	}
}
impl Clock for FixedClock {
	fn now(&self) -> OffsetDateTime {
		*self.0.read()
	}
}

/// Construction inputs shared by every grant handler.
pub struct GrantOptions<M>
where
	M: ?Sized,
{
	/// Token model used for every read and write.
	pub model: Option<Arc<M>>,
	/// Token lifetimes.
	pub config: GrantConfig,
	/// Clock override; defaults to [`SystemClock`].
	pub clock: Option<Arc<dyn Clock>>,
}
impl<M> GrantOptions<M>
where
	M: ?Sized,
{
	/// Creates options from a lifetime configuration; attach a model before building a grant.
	pub fn new(config: GrantConfig) -> Self {
		Self { model: None, config, clock: None }
	}

	/// Sets the token model.
	pub fn model(mut self, model: Arc<M>) -> Self {
		self.model = Some(model);

		self
	}

	/// Overrides the access token lifetime, in seconds.
	pub fn access_token_lifetime(mut self, seconds: u64) -> Self {
		self.config.access_token_lifetime = Some(seconds);

		self
	}

	/// Overrides the refresh token lifetime, in seconds.
	pub fn refresh_token_lifetime(mut self, seconds: u64) -> Self {
		self.config.refresh_token_lifetime = Some(seconds);

		self
	}

	/// Overrides the clock.
	pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
		self.clock = Some(clock);

		self
	}
}
impl<M> Default for GrantOptions<M>
where
	M: ?Sized,
{
	fn default() -> Self {
		Self::new(GrantConfig::default())
	}
}
impl<M> Debug for GrantOptions<M>
where
	M: ?Sized,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("GrantOptions")
			.field("model_set", &self.model.is_some())
			.field("config", &self.config)
			.field("clock", &self.clock)
			.finish()
	}
}

/// Capabilities shared by every grant type.
pub struct GrantBase<M>
where
	M: ?Sized + TokenModel,
{
	model: Arc<M>,
	access_token_lifetime: Duration,
	refresh_token_lifetime: Option<Duration>,
	clock: Arc<dyn Clock>,
}
impl<M> GrantBase<M>
where
	M: ?Sized + TokenModel,
{
	/// Validates the options and builds the shared capability set.
	///
	/// Fails with [`Error::InvalidArgument`] when the model or access token lifetime is missing,
	/// or when any configured lifetime is zero or out of range.
	pub fn new(options: GrantOptions<M>) -> Result<Self> {
		let GrantOptions { model, config, clock } = options;
		let model = model.ok_or_else(|| Error::invalid_argument("Missing parameter: `model`"))?;
		let access_token_lifetime = config.access_token_lifetime()?;
		let refresh_token_lifetime = match config.refresh_token_lifetime {
			Some(_) => Some(config.refresh_token_lifetime()?),
			None => None,
		};
		let clock = clock.unwrap_or_else(|| Arc::new(SystemClock));

		Ok(Self { model, access_token_lifetime, refresh_token_lifetime, clock })
	}

	/// Token model shared with the handler.
	pub fn model(&self) -> &M {
		&self.model
	}

	/// Current instant according to the configured clock.
	pub fn now(&self) -> OffsetDateTime {
		self.clock.now()
	}

	/// Configured access token lifetime.
	pub fn access_token_lifetime(&self) -> Duration {
		self.access_token_lifetime
	}

	/// Configured refresh token lifetime, if any.
	pub fn refresh_token_lifetime(&self) -> Option<Duration> {
		self.refresh_token_lifetime
	}

	/// Mints an access token, preferring the model's generator when it supplies one.
	pub async fn generate_access_token(&self) -> Result<TokenSecret> {
		let custom = self.model.generate_access_token().await?;

		accept_generated("access", custom)
	}

	/// Mints a refresh token, preferring the model's generator when it supplies one.
	pub async fn generate_refresh_token(&self) -> Result<TokenSecret> {
		let custom = self.model.generate_refresh_token().await?;

		accept_generated("refresh", custom)
	}

	/// Current instant plus the access token lifetime.
	pub fn access_token_expires_at(&self) -> Result<OffsetDateTime> {
		expires_after(self.now(), self.access_token_lifetime)
	}

	/// Current instant plus the refresh token lifetime.
	pub fn refresh_token_expires_at(&self) -> Result<OffsetDateTime> {
		let lifetime = self.refresh_token_lifetime.ok_or_else(|| {
			Error::invalid_argument("Missing parameter: `refresh_token_lifetime`")
		})?;

		expires_after(self.now(), lifetime)
	}

	/// Runs the model's scope hook and enforces its verdict.
	///
	/// A non-empty request that the hook answers with `None` or an empty set fails with
	/// [`Error::InvalidScope`]. Otherwise the hook's answer (possibly narrowed, possibly a
	/// model-chosen default when nothing was requested) becomes the granted scope; an empty
	/// answer grants no scope at all.
	pub async fn validate_scope(
		&self,
		user: &M::User,
		client: &M::Client,
		scope: Option<&ScopeSet>,
	) -> Result<Option<ScopeSet>> {
		let requested = scope.is_some_and(|scope| !scope.is_empty());
		let validated = self.model.validate_scope(user, client, scope).await?;

		match validated {
			Some(scope) if !scope.is_empty() => Ok(Some(scope)),
			_ if requested => Err(Error::invalid_scope("Requested scope is invalid")),
			_ => Ok(None),
		}
	}
}
impl<M> Debug for GrantBase<M>
where
	M: ?Sized + TokenModel,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("GrantBase")
			.field("access_token_lifetime", &self.access_token_lifetime)
			.field("refresh_token_lifetime", &self.refresh_token_lifetime)
			.field("clock", &self.clock)
			.finish()
	}
}

fn accept_generated(kind: &str, custom: Option<TokenSecret>) -> Result<TokenSecret> {
	match custom {
		Some(secret) if secret.is_empty() => Err(ModelError::Inconsistent {
			message: format!("custom {kind} token generator returned an empty token"),
		}
		.into()),
		Some(secret) => Ok(secret),
		None => Ok(TokenSecret::generate()),
	}
}

fn expires_after(now: OffsetDateTime, lifetime: Duration) -> Result<OffsetDateTime> {
	now.checked_add(lifetime)
		.ok_or_else(|| Error::invalid_argument("token lifetime exceeds the supported range"))
}
