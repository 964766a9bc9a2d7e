//! Percent-encoding rules per URI component.
//!
//! Query parameters follow `application/x-www-form-urlencoded` rules (space
//! becomes `+`); every other component follows RFC 3986. Already encoded
//! octets (`%` followed by two hex digits) are never encoded a second time,
//! any other `%` becomes `%25`.

use crate::error::{UriError, UriResult};
use crate::template::{Segment, Template};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use std::borrow::Cow;
use std::fmt;

// Each set lists the ASCII characters that must be encoded.

/// unreserved = ALPHA / DIGIT / "-" / "." / "_" / "~"
const UNRESERVED: &AsciiSet = &NON_ALPHANUMERIC
	.remove(b'-')
	.remove(b'.')
	.remove(b'_')
	.remove(b'~');

/// unreserved / sub-delims / ":"
const USER_INFO: &AsciiSet = &UNRESERVED
	.remove(b'!')
	.remove(b'$')
	.remove(b'&')
	.remove(b'\'')
	.remove(b'(')
	.remove(b')')
	.remove(b'*')
	.remove(b'+')
	.remove(b',')
	.remove(b';')
	.remove(b'=')
	.remove(b':');

/// reg-name = *( unreserved / pct-encoded / sub-delims )
const HOST: &AsciiSet = &USER_INFO.add(b':');

/// pchar = unreserved / pct-encoded / sub-delims / ":" / "@"
const PCHAR: &AsciiSet = &USER_INFO.remove(b'@');

const PATH: &AsciiSet = &PCHAR.remove(b'/');

/// A single segment: `/` separates segments and `;` starts matrix parameters.
const PATH_SEGMENT: &AsciiSet = &PCHAR.add(b';');

const MATRIX_PARAM: &AsciiSet = &PATH_SEGMENT.add(b'=');

/// query = fragment = *( pchar / "/" / "?" )
const QUERY: &AsciiSet = &PATH.remove(b'?');

const QUERY_PARAM: &AsciiSet = &QUERY.add(b'&').add(b'=').add(b'+');

const SCHEME: &AsciiSet = &NON_ALPHANUMERIC.remove(b'+').remove(b'-').remove(b'.');

/// The URI component a string is destined for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Component {
	Scheme,
	UserInfo,
	Host,
	Port,
	/// A whole path, `/` allowed.
	Path,
	/// One path segment, `/` and `;` encoded.
	PathSegment,
	/// A matrix parameter name or value.
	MatrixParam,
	/// A query parameter name or value, form encoded.
	QueryParam,
	/// A whole query string.
	Query,
	Fragment,
}

impl Component {
	fn encode_set(self) -> &'static AsciiSet {
		match self {
			Self::Scheme => SCHEME,
			Self::UserInfo => USER_INFO,
			Self::Host => HOST,
			// Ports are digits only and validated separately
			Self::Port => NON_ALPHANUMERIC,
			Self::Path => PATH,
			Self::PathSegment => PATH_SEGMENT,
			Self::MatrixParam => MATRIX_PARAM,
			Self::QueryParam => QUERY_PARAM,
			Self::Query | Self::Fragment => QUERY,
		}
	}

	/// Whether the component may carry percent-encoded octets.
	fn allows_pct_encoded(self) -> bool {
		!matches!(self, Self::Scheme | Self::Port)
	}
}

impl fmt::Display for Component {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			Self::Scheme => "scheme",
			Self::UserInfo => "user info",
			Self::Host => "host",
			Self::Port => "port",
			Self::Path => "path",
			Self::PathSegment => "path segment",
			Self::MatrixParam => "matrix parameter",
			Self::QueryParam => "query parameter",
			Self::Query => "query",
			Self::Fragment => "fragment",
		};
		f.write_str(name)
	}
}

/// Returns true when `bytes[index..]` starts with `%` and two hex digits.
pub(crate) fn is_pct_encoded(bytes: &[u8], index: usize) -> bool {
	bytes.get(index) == Some(&b'%')
		&& bytes.get(index + 1).is_some_and(u8::is_ascii_hexdigit)
		&& bytes.get(index + 2).is_some_and(u8::is_ascii_hexdigit)
}

fn is_ip_literal(input: &str) -> bool {
	input.len() > 2
		&& input.starts_with('[')
		&& input.ends_with(']')
		&& input[1..input.len() - 1]
			.chars()
			.all(|c| c.is_ascii_hexdigit() || matches!(c, ':' | '.' | 'v' | 'V'))
}

fn chunk_is_legal(chunk: &str, set: &'static AsciiSet) -> bool {
	matches!(Cow::from(utf8_percent_encode(chunk, set)), Cow::Borrowed(_))
}

/// Checks whether `input` may appear in `component` without encoding.
///
/// # Examples
///
/// ```
/// use waypoint_uri::encode::{Component, is_legal};
///
/// assert!(is_legal(Component::PathSegment, "caf%C3%A9"));
/// assert!(!is_legal(Component::PathSegment, "a/b"));
/// assert!(is_legal(Component::Path, "a/b"));
/// assert!(!is_legal(Component::QueryParam, "a b"));
/// assert!(!is_legal(Component::Fragment, "100%"));
/// ```
pub fn is_legal(component: Component, input: &str) -> bool {
	match component {
		Component::Port => return input.bytes().all(|b| b.is_ascii_digit()),
		Component::Host if is_ip_literal(input) => return true,
		_ => {}
	}

	let set = component.encode_set();
	let bytes = input.as_bytes();
	let mut start = 0;
	let mut i = 0;
	while i < bytes.len() {
		if bytes[i] == b'%' {
			if !component.allows_pct_encoded()
				|| !is_pct_encoded(bytes, i)
				|| !chunk_is_legal(&input[start..i], set)
			{
				return false;
			}
			i += 3;
			start = i;
		} else {
			i += 1;
		}
	}
	chunk_is_legal(&input[start..], set)
}

/// Like [`is_legal`] but reports the failure as [`UriError::InvalidComponent`].
pub fn validate(component: Component, input: &str) -> UriResult<()> {
	if is_legal(component, input) {
		Ok(())
	} else {
		Err(UriError::invalid(component, input))
	}
}

fn push_encoded(out: &mut String, chunk: &str, component: Component) {
	let set = component.encode_set();
	if component == Component::QueryParam {
		for (n, piece) in chunk.split(' ').enumerate() {
			if n > 0 {
				out.push('+');
			}
			out.extend(utf8_percent_encode(piece, set));
		}
	} else {
		out.extend(utf8_percent_encode(chunk, set));
	}
}

/// Percent-encodes every character of `input` that is illegal in
/// `component`, leaving well-formed `%XX` octets untouched.
///
/// # Examples
///
/// ```
/// use waypoint_uri::encode::{Component, encode};
///
/// assert_eq!(encode(Component::PathSegment, "a b/c"), "a%20b%2Fc");
/// assert_eq!(encode(Component::PathSegment, "already%2Fencoded"), "already%2Fencoded");
/// assert_eq!(encode(Component::Path, "100%"), "100%25");
/// assert_eq!(encode(Component::QueryParam, "a b&c=d"), "a+b%26c%3Dd");
/// ```
pub fn encode(component: Component, input: &str) -> Cow<'_, str> {
	if is_legal(component, input) {
		return Cow::Borrowed(input);
	}

	let bytes = input.as_bytes();
	let mut out = String::with_capacity(input.len() + 16);
	let mut start = 0;
	let mut i = 0;
	while i < bytes.len() {
		if bytes[i] == b'%' {
			push_encoded(&mut out, &input[start..i], component);
			if is_pct_encoded(bytes, i) {
				out.push_str(&input[i..i + 3]);
				i += 3;
			} else {
				out.push_str("%25");
				i += 1;
			}
			start = i;
		} else {
			i += 1;
		}
	}
	push_encoded(&mut out, &input[start..], component);
	Cow::Owned(out)
}

/// Encodes the literal regions of a template string for `component`.
///
/// Parameter tokens are kept as written (in their normalized `{name}` or
/// `{name:regex}` form) so they survive until substitution.
///
/// # Examples
///
/// ```
/// use waypoint_uri::encode::{Component, encode_template};
///
/// let encoded = encode_template(Component::Path, "my files/{name:[a-z ]+}").unwrap();
/// assert_eq!(encoded, "my%20files/{name:[a-z ]+}");
/// ```
///
/// # Errors
///
/// Returns [`UriError::TemplateSyntax`] if the braces do not form valid
/// template parameters.
pub fn encode_template(component: Component, input: &str) -> UriResult<String> {
	let template = Template::parse(input)?;
	Ok(template
		.segments()
		.iter()
		.map(|segment| match segment {
			Segment::Literal(text) => encode(component, text).into_owned(),
			Segment::Parameter(param) => param.surface(),
		})
		.collect())
}

/// Checks the literal regions of a template string, ignoring parameters.
pub fn validate_template(component: Component, input: &str) -> UriResult<()> {
	let template = Template::parse(input)?;
	for segment in template.segments() {
		if let Segment::Literal(text) = segment
			&& !is_legal(component, text)
		{
			return Err(UriError::invalid(component, input));
		}
	}
	Ok(())
}

/// Decodes `%XX` octets. Invalid UTF-8 is replaced with U+FFFD.
pub fn decode(input: &str) -> Cow<'_, str> {
	percent_decode_str(input).decode_utf8_lossy()
}

/// Decodes a form-encoded query value: `+` is a space, then `%XX` octets.
pub fn decode_form(input: &str) -> Cow<'_, str> {
	if input.contains('+') {
		Cow::Owned(decode(&input.replace('+', " ")).into_owned())
	} else {
		decode(input)
	}
}
