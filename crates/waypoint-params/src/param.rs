//! Parameter declarations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where in the request a parameter value comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
	/// A template parameter of the matched route.
	Path,
	Query,
	/// A `;name=value` parameter of the last path segment.
	Matrix,
	Header,
	Cookie,
}

impl fmt::Display for Source {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Self::Path => "path",
			Self::Query => "query",
			Self::Matrix => "matrix",
			Self::Header => "header",
			Self::Cookie => "cookie",
		})
	}
}

/// The type a parameter value is converted to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
	Text,
	/// A signed 64-bit integer.
	Int,
	/// A 64-bit float.
	Float,
	/// `true` or `false`, ignoring case.
	Bool,
	/// Every value of a repeated parameter.
	List(Box<Kind>),
}

impl Kind {
	pub fn list(inner: Kind) -> Self {
		Self::List(Box::new(inner))
	}

	/// Name used in parse errors.
	pub fn name(&self) -> &'static str {
		match self {
			Self::Text => "text",
			Self::Int => "integer",
			Self::Float => "float",
			Self::Bool => "boolean",
			Self::List(_) => "list",
		}
	}
}

/// Declares one parameter of a route.
///
/// # Examples
///
/// ```
/// use waypoint_params::{Kind, ParamSpec, Source};
///
/// let page = ParamSpec::query("page").kind(Kind::Int).default_value("1");
/// assert_eq!(page.source, Source::Query);
/// assert_eq!(page.default.as_deref(), Some("1"));
/// assert!(!page.encoded);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamSpec {
	pub name: String,
	pub source: Source,
	pub kind: Kind,
	/// Raw value used when the request has none.
	pub default: Option<String>,
	/// Keep the value percent-encoded instead of decoding it.
	pub encoded: bool,
}

impl ParamSpec {
	/// A text parameter without default, decoded.
	pub fn new(name: impl Into<String>, source: Source) -> Self {
		Self {
			name: name.into(),
			source,
			kind: Kind::Text,
			default: None,
			encoded: false,
		}
	}

	pub fn path(name: impl Into<String>) -> Self {
		Self::new(name, Source::Path)
	}

	pub fn query(name: impl Into<String>) -> Self {
		Self::new(name, Source::Query)
	}

	pub fn matrix(name: impl Into<String>) -> Self {
		Self::new(name, Source::Matrix)
	}

	pub fn header(name: impl Into<String>) -> Self {
		Self::new(name, Source::Header)
	}

	pub fn cookie(name: impl Into<String>) -> Self {
		Self::new(name, Source::Cookie)
	}

	pub fn kind(mut self, kind: Kind) -> Self {
		self.kind = kind;
		self
	}

	pub fn default_value(mut self, default: impl Into<String>) -> Self {
		self.default = Some(default.into());
		self
	}

	pub fn encoded(mut self, encoded: bool) -> Self {
		self.encoded = encoded;
		self
	}
}
