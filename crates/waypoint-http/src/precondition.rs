//! Request precondition contracts.
//!
//! Conditional request evaluation (`If-Match`, `If-None-Match`,
//! `If-Modified-Since`, `If-Unmodified-Since`) belongs to the HTTP layer.
//! This module fixes the shape of that evaluation: a [`Preconditions`]
//! implementation compares the current validators of a resource with the
//! request and either lets processing [`Proceed`](Precondition::Proceed)
//! or supplies the response to send instead.

use crate::entity_tag::EntityTag;
use chrono::{DateTime, Utc};
use http::header::{ETAG, HeaderName, HeaderValue, LAST_MODIFIED, VARY};
use http::{HeaderMap, Method, StatusCode};
use std::time::SystemTime;

/// Status and headers of a response produced without running a handler.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseDescriptor {
	pub status: StatusCode,
	pub headers: HeaderMap,
}

impl ResponseDescriptor {
	pub fn new(status: StatusCode) -> Self {
		Self {
			status,
			headers: HeaderMap::new(),
		}
	}

	/// `304 Not Modified` carrying the current entity tag.
	///
	/// # Examples
	///
	/// ```
	/// use waypoint_http::{EntityTag, ResponseDescriptor};
	/// use http::StatusCode;
	///
	/// let response = ResponseDescriptor::not_modified(&EntityTag::strong("v2"));
	/// assert_eq!(response.status, StatusCode::NOT_MODIFIED);
	/// assert_eq!(response.headers["etag"], "\"v2\"");
	/// ```
	pub fn not_modified(etag: &EntityTag) -> Self {
		Self::new(StatusCode::NOT_MODIFIED).with_etag(etag)
	}

	/// `412 Precondition Failed` carrying the current entity tag.
	pub fn precondition_failed(etag: &EntityTag) -> Self {
		Self::new(StatusCode::PRECONDITION_FAILED).with_etag(etag)
	}

	/// Sets the `ETag` header. Tags that are not valid header text are
	/// skipped with a warning.
	pub fn with_etag(self, etag: &EntityTag) -> Self {
		self.with_header(ETAG, &etag.to_string())
	}

	/// Sets the `Last-Modified` header as an HTTP-date.
	pub fn with_last_modified(self, last_modified: DateTime<Utc>) -> Self {
		let date = httpdate::fmt_http_date(SystemTime::from(last_modified));
		self.with_header(LAST_MODIFIED, &date)
	}

	/// Sets the `Vary` header to the given request header names.
	/// An empty list leaves the headers untouched.
	pub fn with_vary(self, vary: &[HeaderName]) -> Self {
		if vary.is_empty() {
			return self;
		}
		let value = vary
			.iter()
			.map(HeaderName::as_str)
			.collect::<Vec<_>>()
			.join(", ");
		self.with_header(VARY, &value)
	}

	fn with_header(mut self, name: HeaderName, value: &str) -> Self {
		match HeaderValue::from_str(value) {
			Ok(value) => {
				self.headers.insert(name, value);
			}
			Err(e) => {
				tracing::warn!(header = %name, error = %e, "skipping invalid header value");
			}
		}
		self
	}
}

/// Outcome of evaluating request preconditions.
#[derive(Debug, Clone, PartialEq)]
pub enum Precondition {
	/// The preconditions hold; handle the request normally.
	Proceed,
	/// The preconditions failed; send this response instead.
	Respond(ResponseDescriptor),
}

impl Precondition {
	pub fn is_proceed(&self) -> bool {
		matches!(self, Self::Proceed)
	}

	pub fn response(&self) -> Option<&ResponseDescriptor> {
		match self {
			Self::Proceed => None,
			Self::Respond(response) => Some(response),
		}
	}
}

/// Evaluates the conditional headers of one request.
///
/// Responses returned for entity tag evaluations carry an `ETag` header
/// with the tag that was evaluated.
pub trait Preconditions {
	/// The request method, which decides between 304 and 412 outcomes.
	fn method(&self) -> &Method;

	fn evaluate_etag(&self, etag: &EntityTag) -> Precondition;

	fn evaluate_last_modified(&self, last_modified: DateTime<Utc>) -> Precondition;

	fn evaluate(&self, last_modified: DateTime<Utc>, etag: &EntityTag) -> Precondition;
}

/// Parses an HTTP-date header value.
pub fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
	httpdate::parse_http_date(value).ok().map(DateTime::from)
}
