//! Token lifetime configuration consumed by grant constructors.

// self
use crate::_prelude::*;

/// Default access token lifetime: one hour.
pub const DEFAULT_ACCESS_TOKEN_LIFETIME: u64 = 60 * 60;
/// Default refresh token lifetime: two weeks.
pub const DEFAULT_REFRESH_TOKEN_LIFETIME: u64 = 60 * 60 * 24 * 14;
/// Longest lifetime accepted for either token: ten years.
pub const MAX_TOKEN_LIFETIME: u64 = 60 * 60 * 24 * 365 * 10;

/// Token lifetimes, in seconds.
///
/// Fields are optional so a partially filled configuration can be loaded from disk and
/// rejected with a precise message at grant construction rather than at parse time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GrantConfig {
	/// Seconds an access token stays valid.
	pub access_token_lifetime: Option<u64>,
	/// Seconds a refresh token stays valid.
	pub refresh_token_lifetime: Option<u64>,
}
impl GrantConfig {
	/// Configuration using [`DEFAULT_ACCESS_TOKEN_LIFETIME`] and
	/// [`DEFAULT_REFRESH_TOKEN_LIFETIME`].
	pub const fn with_defaults() -> Self {
		Self {
			access_token_lifetime: Some(DEFAULT_ACCESS_TOKEN_LIFETIME),
			refresh_token_lifetime: Some(DEFAULT_REFRESH_TOKEN_LIFETIME),
		}
	}

	/// Parses a JSON document, reporting the offending field path on failure.
	pub fn from_json_str(raw: &str) -> Result<Self> {
		let deserializer = &mut serde_json::Deserializer::from_str(raw);

		serde_path_to_error::deserialize(deserializer).map_err(|e| {
			Error::invalid_argument(format!("configuration field `{}` is invalid: {}", e.path(), e.inner()))
		})
	}

	/// Validated access token lifetime.
	pub fn access_token_lifetime(&self) -> Result<Duration> {
		lifetime("access_token_lifetime", self.access_token_lifetime)
	}

	/// Validated refresh token lifetime.
	pub fn refresh_token_lifetime(&self) -> Result<Duration> {
		lifetime("refresh_token_lifetime", self.refresh_token_lifetime)
	}
}

fn lifetime(name: &str, seconds: Option<u64>) -> Result<Duration> {
	match seconds {
		None | Some(0) => Err(Error::invalid_argument(format!("Missing parameter: `{name}`"))),
		Some(secs) if secs > MAX_TOKEN_LIFETIME =>
			Err(Error::invalid_argument(format!("`{name}` exceeds {MAX_TOKEN_LIFETIME} seconds"))),
		Some(secs) => Ok(Duration::seconds(secs as i64)),
	}
}
