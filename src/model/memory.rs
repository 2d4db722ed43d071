//! Thread-safe in-memory [`TokenModel`] implementation for local development and tests.

// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use sha2::{Digest, Sha256};
// self
use crate::{
	_prelude::*,
	auth::{AuthorizationCode, CodeId, IssuedToken, ScopeSet, Token},
	model::{ModelFuture, TokenModel},
};

type ScopeValidator<C, U> =
	Arc<dyn Fn(&U, &C, Option<&ScopeSet>) -> Option<ScopeSet> + Send + Sync>;
type CodeMap<C, U> = Arc<RwLock<HashMap<String, CodeEntry<C, U>>>>;
type TokenMap<C, U> = Arc<RwLock<HashMap<String, Token<C, U>>>>;

struct CodeEntry<C, U> {
	record: AuthorizationCode<C, U>,
	revoked: bool,
}

/// Storage backend that keeps codes and tokens in-process.
///
/// Maps are keyed by a SHA-256 fingerprint of the code or access token, so raw bearer values
/// never serve as lookup keys. Revocation is a check-and-set under a single write lock, which
/// satisfies the single-use atomicity [`TokenModel`] demands.
pub struct MemoryModel<C, U> {
	codes: CodeMap<C, U>,
	tokens: TokenMap<C, U>,
	scope_validator: Option<ScopeValidator<C, U>>,
}
impl<C, U> MemoryModel<C, U>
where
	C: Clone,
	U: Clone,
{
	/// Creates an empty model without a scope hook.
	pub fn new() -> Self {
		Self { codes: Default::default(), tokens: Default::default(), scope_validator: None }
	}

	/// Installs a scope hook; returning `None` rejects the requested scope.
	pub fn with_scope_validator<F>(mut self, validator: F) -> Self
	where
		F: 'static + Fn(&U, &C, Option<&ScopeSet>) -> Option<ScopeSet> + Send + Sync,
	{
		self.scope_validator = Some(Arc::new(validator));

		self
	}

	/// Registers an authorization code, replacing any record with the same value.
	pub fn insert_authorization_code(&self, record: AuthorizationCode<C, U>) {
		let key = fingerprint(record.code.as_str());

		self.codes.write().insert(key, CodeEntry { record, revoked: false });
	}

	/// Reports whether a code has been consumed; `None` if the model never saw it.
	pub fn is_revoked(&self, code: &CodeId) -> Option<bool> {
		self.codes.read().get(&fingerprint(code.as_str())).map(|entry| entry.revoked)
	}

	/// Looks up a persisted token by its access token value.
	pub fn token(&self, access_token: &str) -> Option<Token<C, U>> {
		self.tokens.read().get(&fingerprint(access_token)).cloned()
	}

	/// Number of persisted tokens.
	pub fn token_count(&self) -> usize {
		self.tokens.read().len()
	}

	fn fetch_now(&self, code: &CodeId) -> Option<AuthorizationCode<C, U>> {
		self.codes
			.read()
			.get(&fingerprint(code.as_str()))
			.filter(|entry| !entry.revoked)
			.map(|entry| entry.record.clone())
	}

	fn revoke_now(&self, code: &CodeId) -> bool {
		let mut guard = self.codes.write();

		match guard.get_mut(&fingerprint(code.as_str())) {
			Some(entry) if !entry.revoked => {
				entry.revoked = true;

				true
			},
			_ => false,
		}
	}

	fn save_now(&self, token: IssuedToken, client: &C, user: &U) -> Token<C, U> {
		let token = token.into_token(client.clone(), user.clone());
		let key = fingerprint(token.access_token.expose());

		self.tokens.write().insert(key, token.clone());

		token
	}
}
impl<C, U> Clone for MemoryModel<C, U> {
	fn clone(&self) -> Self {
		Self {
			codes: self.codes.clone(),
			tokens: self.tokens.clone(),
			scope_validator: self.scope_validator.clone(),
		}
	}
}
impl<C, U> Default for MemoryModel<C, U>
where
	C: Clone,
	U: Clone,
{
	fn default() -> Self {
		Self::new()
	}
}
impl<C, U> Debug for MemoryModel<C, U> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("MemoryModel")
			.field("codes", &self.codes.read().len())
			.field("tokens", &self.tokens.read().len())
			.field("scope_validator", &self.scope_validator.is_some())
			.finish()
	}
}
impl<C, U> TokenModel for MemoryModel<C, U>
where
	C: 'static + Clone + PartialEq + Debug + Send + Sync,
	U: 'static + Clone + Debug + Send + Sync,
{
	type Client = C;
	type User = U;

	fn get_authorization_code<'a>(
		&'a self,
		code: &'a CodeId,
		_client: &'a C,
	) -> ModelFuture<'a, Option<AuthorizationCode<C, U>>> {
		let record = self.fetch_now(code);

		Box::pin(async move { Ok(record) })
	}

	fn revoke_authorization_code<'a>(
		&'a self,
		code: &'a AuthorizationCode<C, U>,
	) -> ModelFuture<'a, bool> {
		let revoked = self.revoke_now(&code.code);

		Box::pin(async move { Ok(revoked) })
	}

	fn save_token<'a>(
		&'a self,
		token: IssuedToken,
		client: &'a C,
		user: &'a U,
	) -> ModelFuture<'a, Token<C, U>> {
		let token = self.save_now(token, client, user);

		Box::pin(async move { Ok(token) })
	}

	fn validate_scope<'a>(
		&'a self,
		user: &'a U,
		client: &'a C,
		scope: Option<&'a ScopeSet>,
	) -> ModelFuture<'a, Option<ScopeSet>> {
		let validated = match self.scope_validator.as_ref() {
			Some(validator) => validator(user, client, scope),
			None => scope.cloned(),
		};

		Box::pin(async move { Ok(validated) })
	}
}

fn fingerprint(value: &str) -> String {
	let digest = Sha256::digest(value.as_bytes());

	URL_SAFE_NO_PAD.encode(digest)
}
