//! Optional observability helpers for grant exchanges.
//!
//! # Feature Flags
//!
//! - `tracing` (default) wraps every exchange in an `oauth2_issuer.grant` span carrying the
//!   `grant` type and `stage` fields, with a nested span per model call.
//! - `metrics` increments the `oauth2_issuer_grant_total` counter for every
//!   attempt/success/failure, labeled by `grant` + `outcome`; failures also carry the
//!   `error` kind.

mod counter;
mod span;

pub use counter::*;
pub use span::*;

// self
use crate::{_prelude::*, error::ErrorKind};

/// Outcome labels recorded for each exchange.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GrantOutcome {
	/// Entry to a grant handler.
	Attempt,
	/// A token was issued.
	Success,
	/// The exchange failed with the given kind.
	Failure(ErrorKind),
}
impl GrantOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			GrantOutcome::Attempt => "attempt",
			GrantOutcome::Success => "success",
			GrantOutcome::Failure(_) => "failure",
		}
	}
}
impl Display for GrantOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Records the final outcome of an exchange result.
pub(crate) fn record_result<T>(grant: crate::grant::GrantType, result: &Result<T>) {
	let outcome = match result {
		Ok(_) => GrantOutcome::Success,
		Err(e) => GrantOutcome::Failure(e.kind()),
	};

	record_grant_outcome(grant, outcome);
}
