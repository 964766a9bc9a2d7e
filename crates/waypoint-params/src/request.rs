//! Raw parameter values gathered from one request.

use crate::param::Source;
use http::HeaderMap;
use http::header::COOKIE;
use waypoint_uri::MatchResult;

/// The name/value pairs a request offers, still percent-encoded.
///
/// Pairs keep request order so repeated names bind in the order the
/// client sent them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestData {
	path: Vec<(String, String)>,
	query: Vec<(String, String)>,
	matrix: Vec<(String, String)>,
	headers: Vec<(String, String)>,
	cookies: Vec<(String, String)>,
}

impl RequestData {
	pub fn new() -> Self {
		Self::default()
	}

	/// Collects path parameters from a match and splits the query and
	/// matrix parameters out of `path_and_query`.
	///
	/// # Examples
	///
	/// ```
	/// use waypoint_params::{RequestData, Source};
	/// use waypoint_uri::CompiledTemplate;
	///
	/// let template = CompiledTemplate::compile("cars/{make}").unwrap();
	/// let matched = template.matches("cars/mercedes;color=red").unwrap();
	///
	/// let data = RequestData::from_uri("/cars/mercedes;color=red?page=2&page=3", &matched);
	/// assert_eq!(data.values(Source::Path, "make"), vec!["mercedes;color=red"]);
	/// assert_eq!(data.values(Source::Matrix, "color"), vec!["red"]);
	/// assert_eq!(data.values(Source::Query, "page"), vec!["2", "3"]);
	/// ```
	pub fn from_uri(path_and_query: &str, matched: &MatchResult) -> Self {
		let without_fragment = path_and_query
			.split_once('#')
			.map_or(path_and_query, |(before, _)| before);
		let (path, query) = match without_fragment.split_once('?') {
			Some((path, query)) => (path, Some(query)),
			None => (without_fragment, None),
		};

		let data = Self {
			path: matched
				.iter()
				.map(|(name, value)| (name.to_string(), value.to_string()))
				.collect(),
			query: query.map(split_query).unwrap_or_default(),
			matrix: split_matrix(path),
			..Self::default()
		};
		tracing::trace!(
			path = data.path.len(),
			query = data.query.len(),
			matrix = data.matrix.len(),
			"collected request parameters"
		);
		data
	}

	/// Adds every header with a textual value. `Cookie` headers are also
	/// split into cookies.
	pub fn with_headers(mut self, headers: &HeaderMap) -> Self {
		for (name, value) in headers {
			let Ok(value) = value.to_str() else {
				tracing::debug!(header = %name, "skipping non-text header value");
				continue;
			};
			if name == COOKIE {
				self.cookies.extend(split_cookies(value));
			}
			self.headers.push((name.as_str().to_string(), value.to_string()));
		}
		self
	}

	/// Adds a header. Names are compared ignoring case.
	pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.headers.push((name.into().to_ascii_lowercase(), value.into()));
		self
	}

	pub fn with_cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.cookies.push((name.into(), value.into()));
		self
	}

	/// All values offered for `name` by `source`, in request order.
	pub fn values(&self, source: Source, name: &str) -> Vec<&str> {
		let pairs = match source {
			Source::Path => &self.path,
			Source::Query => &self.query,
			Source::Matrix => &self.matrix,
			Source::Header => &self.headers,
			Source::Cookie => &self.cookies,
		};
		pairs
			.iter()
			.filter(|(key, _)| match source {
				Source::Header => key.eq_ignore_ascii_case(name),
				_ => key == name,
			})
			.map(|(_, value)| value.as_str())
			.collect()
	}
}

fn split_pair(pair: &str) -> (String, String) {
	match pair.split_once('=') {
		Some((name, value)) => (name.to_string(), value.to_string()),
		None => (pair.to_string(), String::new()),
	}
}

fn split_query(query: &str) -> Vec<(String, String)> {
	query
		.split('&')
		.filter(|pair| !pair.is_empty())
		.map(split_pair)
		.collect()
}

/// Matrix parameters of the last non-empty path segment.
fn split_matrix(path: &str) -> Vec<(String, String)> {
	let Some(segment) = path.split('/').rev().find(|segment| !segment.is_empty()) else {
		return Vec::new();
	};
	segment
		.split(';')
		.skip(1)
		.filter(|pair| !pair.is_empty())
		.map(split_pair)
		.collect()
}

fn split_cookies(header: &str) -> impl Iterator<Item = (String, String)> + '_ {
	header.split(';').filter_map(|pair| {
		let (name, value) = pair.split_once('=')?;
		let name = name.trim();
		if name.is_empty() {
			return None;
		}
		let value = value.trim();
		let value = value
			.strip_prefix('"')
			.and_then(|v| v.strip_suffix('"'))
			.unwrap_or(value);
		Some((name.to_string(), value.to_string()))
	})
}
