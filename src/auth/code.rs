//! Authorization code records handed out by token models.

// self
use crate::{
	_prelude::*,
	auth::{CodeId, ScopeSet},
};

/// Authorization code record as persisted by a token model.
///
/// `C` and `U` are the model's client and user types. The handler only compares `client`
/// against the authenticated caller and forwards `user` into the issued token.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorizationCode<C, U> {
	/// Opaque code value.
	pub code: CodeId,
	/// Client the code was issued to.
	pub client: C,
	/// Resource owner who approved the request.
	pub user: U,
	/// Instant at which the code stops being redeemable.
	pub expires_at: OffsetDateTime,
	/// Scope granted during the authorization request.
	pub scope: Option<ScopeSet>,
	/// Redirect URI bound to the authorization request, kept verbatim for exact comparison.
	pub redirect_uri: Option<String>,
}
impl<C, U> AuthorizationCode<C, U> {
	/// Creates a record without scope or redirect binding.
	pub fn new(code: CodeId, client: C, user: U, expires_at: OffsetDateTime) -> Self {
		Self { code, client, user, expires_at, scope: None, redirect_uri: None }
	}

	/// Attaches the granted scope.
	pub fn with_scope(mut self, scope: ScopeSet) -> Self {
		self.scope = Some(scope);

		self
	}

	/// Binds the record to a redirect URI.
	pub fn with_redirect_uri(mut self, redirect_uri: impl Into<String>) -> Self {
		self.redirect_uri = Some(redirect_uri.into());

		self
	}

	/// Returns `true` once `instant` has reached the expiry.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		self.expires_at <= instant
	}
}
impl<C, U> Debug for AuthorizationCode<C, U>
where
	C: Debug,
	U: Debug,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthorizationCode")
			.field("code", &self.code)
			.field("client", &self.client)
			.field("user", &self.user)
			.field("expires_at", &self.expires_at)
			.field("scope", &self.scope)
			.field("redirect_uri", &self.redirect_uri)
			.finish()
	}
}
