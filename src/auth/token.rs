//! Token values minted by grants and persisted by token models.

pub mod secret;

// self
use crate::{
	_prelude::*,
	auth::{CodeId, ScopeSet, TokenSecret},
};

/// Token value assembled by a grant and handed to [`TokenModel::save_token`](crate::model::TokenModel::save_token).
///
/// It carries everything except the client and user, which travel as separate arguments so
/// models can store them however they see fit.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuedToken {
	/// Access token secret.
	pub access_token: TokenSecret,
	/// Expiry instant of the access token.
	pub access_token_expires_at: OffsetDateTime,
	/// Refresh token secret.
	pub refresh_token: TokenSecret,
	/// Expiry instant of the refresh token.
	pub refresh_token_expires_at: OffsetDateTime,
	/// Scope granted to the pair, after model validation.
	pub scope: Option<ScopeSet>,
	/// Identifier of the authorization code exchanged for this pair.
	pub authorization_code: CodeId,
}
impl IssuedToken {
	/// Attaches the client and user, producing a persisted [`Token`].
	pub fn into_token<C, U>(self, client: C, user: U) -> Token<C, U> {
		let IssuedToken {
			access_token,
			access_token_expires_at,
			refresh_token,
			refresh_token_expires_at,
			scope,
			authorization_code,
		} = self;

		Token {
			access_token,
			access_token_expires_at,
			refresh_token,
			refresh_token_expires_at,
			scope,
			client,
			user,
			authorization_code,
		}
	}
}
impl Debug for IssuedToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("IssuedToken")
			.field("access_token", &self.access_token)
			.field("access_token_expires_at", &self.access_token_expires_at)
			.field("refresh_token", &self.refresh_token)
			.field("refresh_token_expires_at", &self.refresh_token_expires_at)
			.field("scope", &self.scope)
			.field("authorization_code", &self.authorization_code)
			.finish()
	}
}

/// Persisted token pair returned as the result of an exchange.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Token<C, U> {
	/// Access token secret.
	pub access_token: TokenSecret,
	/// Expiry instant of the access token.
	pub access_token_expires_at: OffsetDateTime,
	/// Refresh token secret.
	pub refresh_token: TokenSecret,
	/// Expiry instant of the refresh token.
	pub refresh_token_expires_at: OffsetDateTime,
	/// Scope granted to the pair.
	pub scope: Option<ScopeSet>,
	/// Client the pair was issued to.
	pub client: C,
	/// Resource owner the pair acts for.
	pub user: U,
	/// Identifier of the exchanged authorization code.
	pub authorization_code: CodeId,
}
impl<C, U> Token<C, U> {
	/// Returns `true` when the access token has expired at `instant`.
	pub fn is_access_token_expired_at(&self, instant: OffsetDateTime) -> bool {
		self.access_token_expires_at <= instant
	}

	/// Returns `true` when the refresh token has expired at `instant`.
	pub fn is_refresh_token_expired_at(&self, instant: OffsetDateTime) -> bool {
		self.refresh_token_expires_at <= instant
	}

	/// Whole seconds until the access token expires, clamped at zero; the `expires_in` value of
	/// an RFC 6749 §5.1 response.
	pub fn expires_in_at(&self, instant: OffsetDateTime) -> i64 {
		(self.access_token_expires_at - instant).whole_seconds().max(0)
	}
}
impl<C, U> Debug for Token<C, U>
where
	C: Debug,
	U: Debug,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Token")
			.field("access_token", &self.access_token)
			.field("access_token_expires_at", &self.access_token_expires_at)
			.field("refresh_token", &self.refresh_token)
			.field("refresh_token_expires_at", &self.refresh_token_expires_at)
			.field("scope", &self.scope)
			.field("client", &self.client)
			.field("user", &self.user)
			.field("authorization_code", &self.authorization_code)
			.finish()
	}
}
