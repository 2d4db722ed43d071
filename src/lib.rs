//! Storage-agnostic OAuth 2.0 token issuance core. Exchanges single-use authorization codes for
//! access/refresh token pairs against a pluggable token model, with grant-aware observability.
//!
//! The crate stops at the token endpoint's grant logic: transport parsing, `grant_type`
//! dispatch, and client authentication belong to the embedding server. Callers build an
//! [`AuthorizationCodeGrant`](grant::AuthorizationCodeGrant) from [`GrantOptions`](grant::GrantOptions)
//! and drive each exchange through [`handle`](grant::AuthorizationCodeGrant::handle).

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod config;
pub mod error;
pub mod grant;
pub mod model;
pub mod obs;
pub mod request;

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::RwLock;
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use url;
#[cfg(test)] use color_eyre as _;
