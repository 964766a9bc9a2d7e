//! Entity tags (`ETag` header values).

use crate::error::{HttpError, HttpResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An opaque validator for a representation, `"value"` or `W/"value"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityTag {
	pub value: String,
	pub weak: bool,
}

impl EntityTag {
	/// Creates a strong entity tag.
	pub fn strong(value: impl Into<String>) -> Self {
		Self {
			value: value.into(),
			weak: false,
		}
	}

	/// Creates a weak entity tag.
	pub fn weak(value: impl Into<String>) -> Self {
		Self {
			value: value.into(),
			weak: true,
		}
	}

	/// Parses a header value such as `"abc"` or `W/"abc"`.
	///
	/// # Examples
	///
	/// ```
	/// use waypoint_http::EntityTag;
	///
	/// let tag = EntityTag::parse("W/\"v1\"").unwrap();
	/// assert!(tag.weak);
	/// assert_eq!(tag.value, "v1");
	/// assert_eq!(tag.to_string(), "W/\"v1\"");
	///
	/// assert!(EntityTag::parse("v1").is_err());
	/// ```
	pub fn parse(input: &str) -> HttpResult<Self> {
		let trimmed = input.trim();
		let (weak, quoted) = match trimmed.strip_prefix("W/") {
			Some(rest) => (true, rest),
			None => (false, trimmed),
		};

		let value = quoted
			.strip_prefix('"')
			.and_then(|rest| rest.strip_suffix('"'))
			.filter(|value| !value.contains('"'))
			.ok_or_else(|| HttpError::InvalidEntityTag(input.to_string()))?;

		Ok(Self {
			value: value.to_string(),
			weak,
		})
	}

	/// Parses a comma separated list, as found in `If-Match` and
	/// `If-None-Match`. Returns `None` for the `*` wildcard.
	pub fn parse_list(input: &str) -> HttpResult<Option<Vec<Self>>> {
		if input.trim() == "*" {
			return Ok(None);
		}
		input
			.split(',')
			.map(str::trim)
			.filter(|item| !item.is_empty())
			.map(Self::parse)
			.collect::<HttpResult<Vec<_>>>()
			.map(Some)
	}

	/// Strong comparison: both tags are strong and their values are equal.
	pub fn strong_eq(&self, other: &Self) -> bool {
		!self.weak && !other.weak && self.value == other.value
	}

	/// Weak comparison: the values are equal, weakness ignored.
	pub fn weak_eq(&self, other: &Self) -> bool {
		self.value == other.value
	}
}

impl fmt::Display for EntityTag {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.weak {
			f.write_str("W/")?;
		}
		write!(f, "\"{}\"", self.value)
	}
}

impl FromStr for EntityTag {
	type Err = HttpError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::parse(s)
	}
}
