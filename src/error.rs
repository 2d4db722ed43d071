//! Issuer-level error types shared across grants, models, and request parsing.

// self
use crate::{_prelude::*, model::ModelError};

/// Issuer-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Canonical issuer error exposed by public APIs.
///
/// Every variant maps onto a stable [`ErrorKind`] so transport layers can render the RFC 6749
/// `error` code and HTTP status without inspecting messages.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Missing or malformed constructor/call arguments; an integration error, never retried.
	#[error("Invalid argument: {reason}.")]
	InvalidArgument {
		/// Human-readable description of the offending argument.
		reason: String,
	},
	/// The exchange request is missing or malforms a required parameter.
	#[error("Invalid request: {reason}.")]
	InvalidRequest {
		/// Human-readable description of the offending parameter.
		reason: String,
	},
	/// The authorization code is unknown, expired, bound elsewhere, or already consumed.
	#[error("Invalid grant: {reason}.")]
	InvalidGrant {
		/// Human-readable description of the rejection.
		reason: String,
	},
	/// The requested scope was rejected by the model's scope hook.
	#[error("Invalid scope: {reason}.")]
	InvalidScope {
		/// Human-readable description of the rejection.
		reason: String,
	},
	/// Failure raised by the token model itself; surfaced uninterpreted.
	#[error("{0}")]
	Model(
		#[from]
		#[source]
		ModelError,
	),
}
impl Error {
	/// Builds an [`Error::InvalidArgument`] from any message.
	pub fn invalid_argument(reason: impl Into<String>) -> Self {
		Self::InvalidArgument { reason: reason.into() }
	}

	/// Builds an [`Error::InvalidRequest`] from any message.
	pub fn invalid_request(reason: impl Into<String>) -> Self {
		Self::InvalidRequest { reason: reason.into() }
	}

	/// Builds an [`Error::InvalidGrant`] from any message.
	pub fn invalid_grant(reason: impl Into<String>) -> Self {
		Self::InvalidGrant { reason: reason.into() }
	}

	/// Builds an [`Error::InvalidScope`] from any message.
	pub fn invalid_scope(reason: impl Into<String>) -> Self {
		Self::InvalidScope { reason: reason.into() }
	}

	/// Returns the taxonomy kind for this error.
	pub fn kind(&self) -> ErrorKind {
		match self {
			Self::InvalidArgument { .. } => ErrorKind::InvalidArgument,
			Self::InvalidRequest { .. } => ErrorKind::InvalidRequest,
			Self::InvalidGrant { .. } => ErrorKind::InvalidGrant,
			Self::InvalidScope { .. } => ErrorKind::InvalidScope,
			Self::Model(_) => ErrorKind::ServerError,
		}
	}
}

/// Error taxonomy used when mapping failures onto transport responses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
	/// Programmer or integration error.
	InvalidArgument,
	/// Malformed exchange request.
	InvalidRequest,
	/// Rejected authorization grant.
	InvalidGrant,
	/// Rejected scope.
	InvalidScope,
	/// Token model failure.
	ServerError,
}
impl ErrorKind {
	/// Returns the stable error code (RFC 6749 §5.2 where one exists).
	pub const fn as_str(self) -> &'static str {
		match self {
			ErrorKind::InvalidArgument => "invalid_argument",
			ErrorKind::InvalidRequest => "invalid_request",
			ErrorKind::InvalidGrant => "invalid_grant",
			ErrorKind::InvalidScope => "invalid_scope",
			ErrorKind::ServerError => "server_error",
		}
	}

	/// HTTP status a transport layer should associate with the kind.
	pub const fn status_code(self) -> u16 {
		match self {
			ErrorKind::InvalidRequest | ErrorKind::InvalidGrant | ErrorKind::InvalidScope => 400,
			ErrorKind::InvalidArgument => 500,
			ErrorKind::ServerError => 503,
		}
	}

	/// Returns `true` for kinds caused by the calling client rather than the server.
	pub const fn is_client_error(self) -> bool {
		matches!(self, ErrorKind::InvalidRequest | ErrorKind::InvalidGrant | ErrorKind::InvalidScope)
	}
}
impl Display for ErrorKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
