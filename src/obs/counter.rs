// self
use crate::{grant::GrantType, obs::GrantOutcome};

/// Records a grant outcome via the global metrics recorder (when enabled).
pub fn record_grant_outcome(grant: GrantType, outcome: GrantOutcome) {
	#[cfg(feature = "metrics")]
	{
		match outcome {
			GrantOutcome::Failure(kind) => metrics::counter!(
				"oauth2_issuer_grant_total",
				"grant" => grant.as_str(),
				"outcome" => outcome.as_str(),
				"error" => kind.as_str()
			)
			.increment(1),
			_ => metrics::counter!(
				"oauth2_issuer_grant_total",
				"grant" => grant.as_str(),
				"outcome" => outcome.as_str()
			)
			.increment(1),
		}
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (grant, outcome);
	}
}
