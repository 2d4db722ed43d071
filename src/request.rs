//! Immutable carrier for inbound token-endpoint parameters.
//!
//! Transport layers build a [`Request`] once from whatever framework they run on; grants only
//! read from it. `body` and `query` hold JSON values so both form-decoded strings and
//! JSON-bodied requests (where a code may arrive as a number) can be represented faithfully.

// std
use std::collections::btree_map::Entry;
// crates.io
use serde_json::Value;
use url::form_urlencoded;
// self
use crate::_prelude::*;

/// Read-only view of an exchange request.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Request {
	method: String,
	headers: BTreeMap<String, String>,
	query: BTreeMap<String, Value>,
	body: BTreeMap<String, Value>,
}
impl Request {
	/// Returns a builder for a request using the given HTTP method.
	pub fn builder(method: impl Into<String>) -> RequestBuilder {
		RequestBuilder {
			inner: Request { method: method.into().to_ascii_uppercase(), ..Default::default() },
		}
	}

	/// Builds a `POST` request from an `application/x-www-form-urlencoded` body.
	///
	/// Repeated keys are collected into an array so grants can reject them as malformed;
	/// RFC 6749 §3.2 forbids repeating parameters.
	pub fn from_form(body: &[u8]) -> Self {
		let mut request = Request::builder("POST")
			.header("content-type", "application/x-www-form-urlencoded")
			.build();

		for (key, value) in form_urlencoded::parse(body) {
			let value = Value::String(value.into_owned());

			match request.body.entry(key.into_owned()) {
				Entry::Vacant(entry) => {
					entry.insert(value);
				},
				Entry::Occupied(mut entry) => match entry.get_mut() {
					Value::Array(values) => values.push(value),
					first => *first = Value::Array(vec![first.take(), value]),
				},
			}
		}

		request
	}

	/// HTTP method, upper-cased.
	pub fn method(&self) -> &str {
		&self.method
	}

	/// Header value by case-insensitive name.
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
	}

	/// Query parameter by name.
	pub fn query(&self, name: &str) -> Option<&Value> {
		self.query.get(name)
	}

	/// Body parameter by name.
	pub fn body(&self, name: &str) -> Option<&Value> {
		self.body.get(name)
	}
}

/// Builder for [`Request`].
#[derive(Clone, Debug)]
pub struct RequestBuilder {
	inner: Request,
}
impl RequestBuilder {
	/// Adds a header; names are stored lower-cased.
	pub fn header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
		self.inner.headers.insert(name.as_ref().to_ascii_lowercase(), value.into());

		self
	}

	/// Adds a query parameter.
	pub fn query(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
		self.inner.query.insert(name.into(), value.into());

		self
	}

	/// Adds a body parameter.
	pub fn body(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
		self.inner.body.insert(name.into(), value.into());

		self
	}

	/// Finalizes the request.
	pub fn build(self) -> Request {
		self.inner
	}
}
