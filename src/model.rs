//! Persistence contract consumed by grants, plus an in-memory reference implementation.
//!
//! Grants never touch storage directly. Every read and write goes through [`TokenModel`], whose
//! operations return boxed `Send` futures so implementations can await databases, caches, or
//! remote services without tying the crate to a runtime.
//!
//! Mandatory operations (`get_authorization_code`, `revoke_authorization_code`, `save_token`)
//! are required trait methods. Optional hooks (`validate_scope`, `generate_access_token`,
//! `generate_refresh_token`) ship default bodies that pass the scope through or defer to the
//! built-in generator.

pub mod memory;

pub use memory::MemoryModel;

// self
use crate::{
	_prelude::*,
	auth::{AuthorizationCode, CodeId, IssuedToken, ScopeSet, Token, TokenSecret},
};

/// Boxed future returned by every [`TokenModel`] operation.
pub type ModelFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, ModelError>> + 'a + Send>>;

/// Authorization code record type produced by a model.
pub type ModelCode<M> =
	AuthorizationCode<<M as TokenModel>::Client, <M as TokenModel>::User>;
/// Token type persisted by a model.
pub type ModelToken<M> = Token<<M as TokenModel>::Client, <M as TokenModel>::User>;

/// Storage contract implemented by token models.
///
/// # Atomicity
///
/// [`revoke_authorization_code`](Self::revoke_authorization_code) must be atomic with respect to
/// concurrent exchanges on the same code: when two redemptions race, exactly one call may
/// return `true`. Grants rely on this to keep codes single-use.
pub trait TokenModel
where
	Self: Send + Sync,
{
	/// Client representation; compared with `==` to bind codes to their client.
	type Client: Clone + PartialEq + Debug + Send + Sync;
	/// Resource-owner representation; carried through untouched.
	type User: Clone + Debug + Send + Sync;

	/// Looks up an authorization code issued to `client`.
	///
	/// Unknown and already-revoked codes must both resolve to `None`.
	fn get_authorization_code<'a>(
		&'a self,
		code: &'a CodeId,
		client: &'a Self::Client,
	) -> ModelFuture<'a, Option<ModelCode<Self>>>;

	/// Consumes an authorization code, returning `false` if it was unknown or already consumed.
	fn revoke_authorization_code<'a>(&'a self, code: &'a ModelCode<Self>) -> ModelFuture<'a, bool>;

	/// Persists a freshly minted token pair and returns the stored value.
	fn save_token<'a>(
		&'a self,
		token: IssuedToken,
		client: &'a Self::Client,
		user: &'a Self::User,
	) -> ModelFuture<'a, ModelToken<Self>>;

	/// Validates (and optionally narrows) the scope granted to a new token pair.
	///
	/// Returning `None` (or an empty set) for a non-empty request rejects it. The default
	/// implementation passes the requested scope through unchanged.
	fn validate_scope<'a>(
		&'a self,
		user: &'a Self::User,
		client: &'a Self::Client,
		scope: Option<&'a ScopeSet>,
	) -> ModelFuture<'a, Option<ScopeSet>> {
		let _ = (user, client);
		let scope = scope.cloned();

		Box::pin(async move { Ok(scope) })
	}

	/// Mints a custom access token; `None` selects the built-in generator.
	fn generate_access_token(&self) -> ModelFuture<'_, Option<TokenSecret>> {
		Box::pin(async { Ok(None) })
	}

	/// Mints a custom refresh token; `None` selects the built-in generator.
	fn generate_refresh_token(&self) -> ModelFuture<'_, Option<TokenSecret>> {
		Box::pin(async { Ok(None) })
	}
}

/// Error type produced by [`TokenModel`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum ModelError {
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
	/// The backend returned data that violates the model contract.
	#[error("Model returned inconsistent data: {message}.")]
	Inconsistent {
		/// Human-readable error payload.
		message: String,
	},
}
impl ModelError {
	/// Convenience constructor for [`ModelError::Backend`].
	pub fn backend(message: impl Into<String>) -> Self {
		Self::Backend { message: message.into() }
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::auth::{ClientId, UserId};

	struct Bare;
	impl TokenModel for Bare {
		type Client = ClientId;
		type User = UserId;

		fn get_authorization_code<'a>(
			&'a self,
			_: &'a CodeId,
			_: &'a Self::Client,
		) -> ModelFuture<'a, Option<ModelCode<Self>>> {
			Box::pin(async { Ok(None) })
		}

		fn revoke_authorization_code<'a>(&'a self, _: &'a ModelCode<Self>) -> ModelFuture<'a, bool> {
			Box::pin(async { Ok(false) })
		}

		fn save_token<'a>(
			&'a self,
			_: IssuedToken,
			_: &'a Self::Client,
			_: &'a Self::User,
		) -> ModelFuture<'a, ModelToken<Self>> {
			Box::pin(async { Err(ModelError::backend("read-only")) })
		}
	}

	#[tokio::test]
	async fn optional_hooks_default_to_passthrough() {
		let model = Bare;
		let client = ClientId::new("client").expect("Client fixture should be valid.");
		let user = UserId::new("user").expect("User fixture should be valid.");
		let scope: ScopeSet = "read write".parse().expect("Scope fixture should parse.");

		assert_eq!(
			model
				.validate_scope(&user, &client, Some(&scope))
				.await
				.expect("Default scope hook should not fail."),
			Some(scope)
		);
		assert_eq!(
			model.validate_scope(&user, &client, None).await.expect("Default hook should not fail."),
			None
		);
		assert!(model.generate_access_token().await.expect("Default hook should not fail.").is_none());
		assert!(
			model.generate_refresh_token().await.expect("Default hook should not fail.").is_none()
		);
	}

	#[test]
	fn model_error_round_trips_through_json() {
		let error = ModelError::backend("pool exhausted");
		let payload = serde_json::to_string(&error).expect("ModelError should serialize.");
		let back: ModelError = serde_json::from_str(&payload).expect("ModelError should parse.");

		assert_eq!(back, error);
		assert_eq!(back.to_string(), "Backend failure: pool exhausted.");
	}
}
