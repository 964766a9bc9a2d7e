//! Matching request paths against compiled templates.
//!
//! Matching works on the path exactly as received: values are returned
//! still percent-encoded and it is up to the caller to decode them (see
//! [`MatchResult::get_decoded`]).

use crate::encode;
use crate::template::{CompiledTemplate, Segment};
use regex::Captures;
use std::borrow::Cow;
use std::collections::HashMap;

/// The outcome of a successful match.
///
/// Values are keyed by parameter name in first-occurrence order. When a
/// name occurs more than once in the template every occurrence captured the
/// same text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
	template: String,
	matched: String,
	names: Vec<String>,
	values: Vec<String>,
	occurrences: Vec<String>,
	literals: Vec<String>,
}

impl MatchResult {
	/// The template that produced this match.
	pub fn template(&self) -> &str {
		&self.template
	}

	/// The portion of the path consumed by the template.
	pub fn matched_path(&self) -> &str {
		&self.matched
	}

	/// The encoded value captured for `name`.
	pub fn get(&self, name: &str) -> Option<&str> {
		self.names
			.iter()
			.position(|n| n == name)
			.map(|index| self.values[index].as_str())
	}

	/// The value captured for `name`, percent-decoded.
	pub fn get_decoded(&self, name: &str) -> Option<Cow<'_, str>> {
		self.get(name).map(encode::decode)
	}

	pub fn contains(&self, name: &str) -> bool {
		self.names.iter().any(|n| n == name)
	}

	/// Parameter names in first-occurrence order.
	pub fn names(&self) -> &[String] {
		&self.names
	}

	/// Values aligned with [`names`](Self::names).
	pub fn values(&self) -> &[String] {
		&self.values
	}

	/// One value per parameter occurrence, repeats included.
	pub fn occurrence_values(&self) -> &[String] {
		&self.occurrences
	}

	/// The literal regions of the template that were verified by the match.
	pub fn literals(&self) -> &[String] {
		&self.literals
	}

	pub fn len(&self) -> usize {
		self.names.len()
	}

	pub fn is_empty(&self) -> bool {
		self.names.is_empty()
	}

	/// Iterates over `(name, encoded value)` pairs.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
		self.names
			.iter()
			.map(String::as_str)
			.zip(self.values.iter().map(String::as_str))
	}

	/// Copies the values into a map, suitable for
	/// [`UriBuilder::build_from_map`](crate::UriBuilder::build_from_map).
	pub fn to_map(&self) -> HashMap<String, String> {
		self.iter()
			.map(|(name, value)| (name.to_string(), value.to_string()))
			.collect()
	}
}

/// Matches the whole of `path` against `template`.
///
/// Returns `None` when the path does not match, including when two
/// occurrences of the same parameter captured different text.
///
/// # Examples
///
/// ```
/// use waypoint_uri::{CompiledTemplate, match_path};
///
/// let template = CompiledTemplate::compile("{a}/{b}/{a}").unwrap();
///
/// let result = match_path(&template, "x/y/x").unwrap();
/// assert_eq!(result.get("a"), Some("x"));
/// assert_eq!(result.get("b"), Some("y"));
///
/// assert!(match_path(&template, "x/y/z").is_none());
/// ```
pub fn match_path(template: &CompiledTemplate, path: &str) -> Option<MatchResult> {
	let captures = template.inner.regex.captures(path)?;
	let result = collect(template, &captures, path.to_string());
	tracing::trace!(
		template = %template,
		path = %path,
		matched = result.is_some(),
		"matched path against template"
	);
	result
}

/// Matches a leading portion of `path` that ends at a segment boundary.
///
/// On success returns the match and the unmatched remainder, which is
/// either empty or starts with `/`.
///
/// # Examples
///
/// ```
/// use waypoint_uri::{CompiledTemplate, match_prefix};
///
/// let template = CompiledTemplate::compile("users/{id}").unwrap();
/// let (result, rest) = match_prefix(&template, "users/7/posts/3").unwrap();
/// assert_eq!(result.get("id"), Some("7"));
/// assert_eq!(rest, "/posts/3");
///
/// // Never splits a segment
/// assert!(match_prefix(&template, "users").is_none());
/// ```
pub fn match_prefix<'p>(
	template: &CompiledTemplate,
	path: &'p str,
) -> Option<(MatchResult, &'p str)> {
	let captures = template.inner.prefix_regex.captures(path)?;
	let remainder = captures
		.get(captures.len() - 1)
		.map_or("", |m| m.as_str());
	let consumed = &path[..path.len() - remainder.len()];
	let result = collect(template, &captures, consumed.to_string())?;
	tracing::trace!(
		template = %template,
		path = %path,
		remainder = %remainder,
		"matched path prefix against template"
	);
	Some((result, remainder))
}

fn collect(template: &CompiledTemplate, captures: &Captures<'_>, matched: String) -> Option<MatchResult> {
	let inner = &template.inner;
	let mut values: Vec<Option<String>> = vec![None; inner.names.len()];
	let mut occurrences = Vec::with_capacity(inner.occurrences.len());

	for occurrence in &inner.occurrences {
		let value = captures
			.get(occurrence.group)
			.map_or("", |m| m.as_str());
		match &values[occurrence.ordinal] {
			Some(existing) if existing != value => {
				tracing::trace!(
					template = %template,
					parameter = %inner.names[occurrence.ordinal],
					"repeated parameter captured different values"
				);
				return None;
			}
			Some(_) => {}
			None => values[occurrence.ordinal] = Some(value.to_string()),
		}
		occurrences.push(value.to_string());
	}

	let literals = template
		.segments()
		.iter()
		.filter_map(|segment| match segment {
			Segment::Literal(text) => Some(text.clone()),
			Segment::Parameter(_) => None,
		})
		.collect();

	Some(MatchResult {
		template: template.template().to_string(),
		matched,
		names: inner.names.clone(),
		values: values.into_iter().map(Option::unwrap_or_default).collect(),
		occurrences,
		literals,
	})
}

impl CompiledTemplate {
	/// Matches the whole of `path`. See [`match_path`].
	pub fn matches(&self, path: &str) -> Option<MatchResult> {
		match_path(self, path)
	}

	/// Whether `path` matches, including the repeated-name check.
	pub fn is_match(&self, path: &str) -> bool {
		match_path(self, path).is_some()
	}

	/// Matches a leading portion of `path`. See [`match_prefix`].
	pub fn match_prefix<'p>(&self, path: &'p str) -> Option<(MatchResult, &'p str)> {
		match_prefix(self, path)
	}
}
