//! Authorization Code grant (RFC 6749 §4.1) exchange.
//!
//! [`AuthorizationCodeGrant::handle`] runs one exchange as a strictly ordered pipeline:
//!
//! 1. extract and format-check `code` from the request body,
//! 2. fetch the record from the model and check client binding and expiry,
//! 3. check the redirect URI when the record is bound to one,
//! 4. revoke the code through the model,
//! 5. validate scope, mint both tokens, compute both expiries, and persist the pair.
//!
//! Revocation sits between validation and issuance, so a replayed request sees the code as
//! absent (or loses the revoke race) and fails with `invalid_grant` before anything is minted.

// std
use std::borrow::Cow;
// crates.io
use serde_json::Value;
// self
use crate::{
	_prelude::*,
	auth::{CodeId, IssuedToken, ScopeSet},
	grant::{GrantBase, GrantOptions, GrantType},
	model::{ModelCode, ModelToken, TokenModel},
	obs::{self, GrantOutcome, GrantSpan},
	request::Request,
};

const GRANT: GrantType = GrantType::AuthorizationCode;

/// Handler for the `authorization_code` grant.
pub struct AuthorizationCodeGrant<M>
where
	M: ?Sized + TokenModel,
{
	base: GrantBase<M>,
}
impl<M> AuthorizationCodeGrant<M>
where
	M: ?Sized + TokenModel,
{
	/// Builds the handler.
	///
	/// On top of [`GrantBase::new`]'s checks, a refresh token lifetime is mandatory because this
	/// grant always issues a refresh token.
	pub fn new(options: GrantOptions<M>) -> Result<Self> {
		if options.model.is_none() {
			return Err(Error::invalid_argument("Missing parameter: `model`"));
		}

		options.config.refresh_token_lifetime()?;

		Ok(Self { base: GrantBase::new(options)? })
	}

	/// Shared capabilities backing this handler.
	pub fn base(&self) -> &GrantBase<M> {
		&self.base
	}

	/// Exchanges the request's authorization code for a persisted token pair.
	///
	/// A missing `request` or `client` fails with [`Error::InvalidArgument`]. Any other failure
	/// stops the pipeline at the step that raised it and is returned unchanged.
	pub async fn handle(
		&self,
		request: Option<&Request>,
		client: Option<&M::Client>,
	) -> Result<ModelToken<M>> {
		let span = GrantSpan::new(GRANT, "handle");

		obs::record_grant_outcome(GRANT, GrantOutcome::Attempt);

		let result = span
			.instrument(async move {
				let request =
					request.ok_or_else(|| Error::invalid_argument("Missing parameter: `request`"))?;
				let client =
					client.ok_or_else(|| Error::invalid_argument("Missing parameter: `client`"))?;
				let code = self.get_authorization_code(request, client).await?;

				self.validate_redirect_uri(request, &code)?;

				let code = self.revoke_authorization_code(code).await?;

				self.save_token(&code.user, client, &code.code, code.scope.as_ref()).await
			})
			.await;

		if let Err(e) = &result {
			span.reject(e);
		}

		obs::record_result(GRANT, &result);

		result
	}

	/// Reads `code` from the request body and loads the matching, still-valid record.
	///
	/// Fails with [`Error::InvalidRequest`] when `code` is absent or malformed, and with
	/// [`Error::InvalidGrant`] when the model has no such code, the code belongs to another
	/// client, or it has expired.
	pub async fn get_authorization_code(
		&self,
		request: &Request,
		client: &M::Client,
	) -> Result<ModelCode<M>> {
		let code = extract_code(request)?;
		let record = GrantSpan::new(GRANT, "fetch_code")
			.instrument(self.base.model().get_authorization_code(&code, client))
			.await?
			.ok_or_else(|| Error::invalid_grant("authorization code is invalid"))?;

		if record.client != *client {
			return Err(Error::invalid_grant("authorization code is invalid"));
		}
		if record.is_expired_at(self.base.now()) {
			return Err(Error::invalid_grant("authorization code has expired"));
		}

		Ok(record)
	}

	/// Requires the request's `redirect_uri` (body, then query) to be identical to the one the
	/// code was bound to, as RFC 6749 §4.1.3 demands. Codes without a bound URI pass.
	///
	/// The comparison is on the raw string; equivalent spellings of the same URI are rejected.
	pub fn validate_redirect_uri(&self, request: &Request, code: &ModelCode<M>) -> Result<()> {
		let Some(expected) = code.redirect_uri.as_deref() else {
			return Ok(());
		};
		let supplied = match request.body("redirect_uri").or_else(|| request.query("redirect_uri")) {
			None | Some(Value::Null) =>
				return Err(Error::invalid_request("Missing parameter: `redirect_uri`")),
			Some(Value::String(uri)) => uri.as_str(),
			Some(_) => return Err(Error::invalid_request("Invalid parameter: `redirect_uri`")),
		};

		Url::parse(supplied)
			.map_err(|_| Error::invalid_request("`redirect_uri` is not a valid URI"))?;

		if supplied != expected {
			return Err(Error::invalid_request("`redirect_uri` is invalid"));
		}

		Ok(())
	}

	/// Consumes the code through the model and hands the record back for token assembly.
	///
	/// Fails with [`Error::InvalidGrant`] when the model reports the code as unknown or already
	/// consumed.
	pub async fn revoke_authorization_code(&self, code: ModelCode<M>) -> Result<ModelCode<M>> {
		let revoked = GrantSpan::new(GRANT, "revoke_code")
			.instrument(self.base.model().revoke_authorization_code(&code))
			.await?;

		if !revoked {
			return Err(Error::invalid_grant("authorization code is invalid"));
		}

		Ok(code)
	}

	/// Validates scope, mints the token pair, and persists it through the model.
	pub async fn save_token(
		&self,
		user: &M::User,
		client: &M::Client,
		authorization_code: &CodeId,
		scope: Option<&ScopeSet>,
	) -> Result<ModelToken<M>> {
		let scope = self.base.validate_scope(user, client, scope).await?;
		let access_token = self.base.generate_access_token().await?;
		let refresh_token = self.base.generate_refresh_token().await?;
		let token = IssuedToken {
			access_token,
			access_token_expires_at: self.base.access_token_expires_at()?,
			refresh_token,
			refresh_token_expires_at: self.base.refresh_token_expires_at()?,
			scope,
			authorization_code: authorization_code.clone(),
		};
		let saved = GrantSpan::new(GRANT, "save_token")
			.instrument(self.base.model().save_token(token, client, user))
			.await?;

		Ok(saved)
	}
}
impl<M> Debug for AuthorizationCodeGrant<M>
where
	M: ?Sized + TokenModel,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthorizationCodeGrant").field("base", &self.base).finish()
	}
}

fn extract_code(request: &Request) -> Result<CodeId> {
	let raw = match request.body("code") {
		None | Some(Value::Null) => None,
		Some(Value::String(code)) => Some(Cow::Borrowed(code.as_str())),
		Some(Value::Number(code)) => Some(Cow::Owned(code.to_string())),
		Some(_) => return Err(Error::invalid_request("Invalid parameter: `code`")),
	}
	.filter(|code| !code.is_empty())
	.ok_or_else(|| Error::invalid_request("Missing parameter: `code`"))?;

	CodeId::new(raw.as_ref()).map_err(|_| Error::invalid_request("Invalid parameter: `code`"))
}
