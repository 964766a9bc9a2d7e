//! Fluent URI construction with template substitution.
//!
//! A [`UriBuilder`] keeps every component in its prepared form: literal
//! text is encoded (or validated, when automatic encoding is off) as soon
//! as it is set, while `{name}` parameter tokens are kept verbatim until one
//! of the `build*` methods substitutes values for them.
//!
//! ```
//! use waypoint_uri::UriBuilder;
//!
//! let uri = UriBuilder::from_path("widgets/{id}")
//!     .unwrap()
//!     .scheme("https")
//!     .unwrap()
//!     .host("example.com")
//!     .unwrap()
//!     .query_param("q", "{term}")
//!     .unwrap()
//!     .build_with(&[("id", "12"), ("term", "red shoes")])
//!     .unwrap();
//!
//! assert_eq!(uri.to_string(), "https://example.com/widgets/12?q=red+shoes");
//! ```

use crate::config::UriConfig;
use crate::encode::{self, Component};
use crate::error::{UriError, UriResult};
use crate::template::{CompiledTemplate, Segment, Template};
use crate::uri::{URI_REFERENCE, Uri};
use std::collections::HashMap;

/// Prepared text of one component.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Part {
	text: String,
	templated: bool,
}

impl Part {
	fn literal(text: impl Into<String>) -> Self {
		Self {
			text: text.into(),
			templated: false,
		}
	}

	fn refresh(&mut self) {
		self.templated = self.text.contains('{');
	}
}

/// How a value-supplying build treats parameters without a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Missing {
	Empty,
	Fail,
}

/// Positions of the characters of `input` that are outside `{...}` tokens.
fn top_level(input: &str) -> Vec<(usize, char)> {
	let mut depth = 0usize;
	let mut positions = Vec::new();
	for (index, c) in input.char_indices() {
		match c {
			'{' => depth += 1,
			'}' => depth = depth.saturating_sub(1),
			_ if depth == 0 => positions.push((index, c)),
			_ => {}
		}
	}
	positions
}

/// Removes the matrix parameters of the final path segment.
fn strip_matrix(path: &str) -> &str {
	let positions = top_level(path);
	let segment_start = positions
		.iter()
		.rev()
		.find(|(_, c)| *c == '/')
		.map_or(0, |(index, _)| index + 1);
	match positions
		.iter()
		.find(|(index, c)| *index >= segment_start && *c == ';')
	{
		Some((index, _)) => &path[..*index],
		None => path,
	}
}

/// Splits `[user-info@]host[:port]`.
fn split_authority(authority: &str) -> (Option<&str>, &str, Option<&str>) {
	let positions = top_level(authority);
	let (user_info, host_start) = match positions.iter().rev().find(|(_, c)| *c == '@') {
		Some((index, _)) => (Some(&authority[..*index]), index + 1),
		None => (None, 0),
	};
	let host_port = &authority[host_start..];
	let bracket = positions
		.iter()
		.rev()
		.find(|(index, c)| *index >= host_start && *c == ']')
		.map_or(host_start, |(index, _)| *index);
	match positions
		.iter()
		.rev()
		.find(|(index, c)| *index >= bracket && *c == ':')
	{
		Some((index, _)) => (
			user_info,
			&authority[host_start..*index],
			Some(&authority[index + 1..]),
		),
		None => (user_info, host_port, None),
	}
}

/// Builds URIs from components and templates.
///
/// Setters that accept text return `UriResult<Self>`: they fail with
/// [`UriError::TemplateSyntax`] for malformed parameter tokens and, when
/// automatic encoding is off, with [`UriError::InvalidComponent`] for
/// literal text that is illegal in the target component.
///
/// Cloning produces a fully independent builder, and building never
/// modifies the builder, so a configured builder can be reused as a
/// template for many URIs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UriBuilder {
	scheme: Option<Part>,
	user_info: Option<Part>,
	host: Option<Part>,
	port: Option<Part>,
	path: Part,
	query: Part,
	fragment: Option<Part>,
	auto_encode: bool,
}

impl Default for UriBuilder {
	fn default() -> Self {
		Self::new()
	}
}

impl UriBuilder {
	/// Creates an empty builder with automatic encoding enabled.
	pub fn new() -> Self {
		Self::with_config(&UriConfig::default())
	}

	/// Creates an empty builder using the defaults of `config`.
	pub fn with_config(config: &UriConfig) -> Self {
		Self {
			scheme: None,
			user_info: None,
			host: None,
			port: None,
			path: Part::default(),
			query: Part::default(),
			fragment: None,
			auto_encode: config.auto_encode,
		}
	}

	/// Creates a builder whose path is `path`.
	pub fn from_path(path: &str) -> UriResult<Self> {
		Self::new().replace_path(path)
	}

	/// Creates a builder whose path is `path`, choosing whether illegal
	/// characters are encoded or rejected.
	pub fn from_path_encoded(path: &str, encode: bool) -> UriResult<Self> {
		Self::new().encode(encode).replace_path(path)
	}

	/// Creates a builder from a URI string that may contain template
	/// parameters.
	///
	/// The string is split into components with the generic RFC 3986
	/// reference grammar, then each component is handled by its setter.
	pub fn from_uri(uri: &str) -> UriResult<Self> {
		Self::new().uri_str(uri)
	}

	/// Creates a builder whose path is the given template.
	pub fn from_template(template: &CompiledTemplate) -> Self {
		Self::new().path_template(template)
	}

	/// Turns automatic encoding on or off for subsequent setters and for
	/// values substituted at build time.
	pub fn encode(mut self, enabled: bool) -> Self {
		self.auto_encode = enabled;
		self
	}

	pub fn is_encoding(&self) -> bool {
		self.auto_encode
	}

	fn prepare(&self, component: Component, text: &str) -> UriResult<Part> {
		let encodable = !matches!(component, Component::Scheme | Component::Port);
		let prepared = if self.auto_encode && encodable {
			encode::encode_template(component, text)?
		} else {
			encode::validate_template(component, text)?;
			text.to_string()
		};
		let mut part = Part::literal(prepared);
		part.refresh();
		Ok(part)
	}

	fn prepare_optional(&self, component: Component, text: Option<&str>) -> UriResult<Option<Part>> {
		text.map(|text| self.prepare(component, text)).transpose()
	}

	/// Copies every component that `uri` defines, leaving the others as
	/// they are.
	pub fn uri(mut self, uri: &Uri) -> Self {
		if let Some(scheme) = uri.scheme() {
			self.scheme = Some(Part::literal(scheme));
		}
		if uri.authority().is_some() {
			self.user_info = uri.user_info().map(Part::literal);
			self.host = uri.host().map(Part::literal);
			self.port = uri.port().map(|port| Part::literal(port.to_string()));
		}
		if !uri.path().is_empty() {
			self.path = Part::literal(uri.path());
		}
		if let Some(query) = uri.query() {
			self.query = Part::literal(query);
		}
		if let Some(fragment) = uri.fragment() {
			self.fragment = Some(Part::literal(fragment));
		}
		self
	}

	pub(crate) fn uri_str(mut self, uri: &str) -> UriResult<Self> {
		let captures = URI_REFERENCE
			.captures(uri)
			.ok_or_else(|| UriError::malformed(uri, "not a URI reference"))?;
		let part = |index: usize| captures.get(index).map(|m| m.as_str());

		if let Some(scheme) = part(1) {
			self = self.scheme(scheme)?;
		}
		if let Some(authority) = part(2) {
			self = self.authority(authority)?;
		}
		if let Some(path) = part(3).filter(|path| !path.is_empty()) {
			self = self.replace_path(path)?;
		}
		if let Some(query) = part(4) {
			self = self.replace_query_params(query)?;
		}
		if let Some(fragment) = part(5) {
			self = self.fragment(fragment)?;
		}
		Ok(self)
	}

	/// Sets or clears the scheme. Schemes are validated, never encoded.
	pub fn scheme<'a>(mut self, scheme: impl Into<Option<&'a str>>) -> UriResult<Self> {
		self.scheme = self.prepare_optional(Component::Scheme, scheme.into())?;
		Ok(self)
	}

	/// Replaces everything between the scheme and the query: the authority
	/// when `ssp` starts with `//`, and the path. A `?` starts the query.
	pub fn scheme_specific_part(self, ssp: &str) -> UriResult<Self> {
		let (ssp, query) = match top_level(ssp).iter().find(|(_, c)| *c == '?') {
			Some((index, _)) => (&ssp[..*index], Some(&ssp[index + 1..])),
			None => (ssp, None),
		};

		let mut builder = match ssp.strip_prefix("//") {
			Some(rest) => {
				let end = top_level(rest)
					.iter()
					.find(|(_, c)| *c == '/')
					.map_or(rest.len(), |(index, _)| *index);
				self.authority(&rest[..end])?.replace_path(&rest[end..])?
			}
			None => self.authority(None)?.replace_path(ssp)?,
		};

		if let Some(query) = query {
			builder = builder.replace_query_params(query)?;
		}
		Ok(builder)
	}

	/// Sets or clears the whole authority, `[user-info@]host[:port]`.
	pub fn authority<'a>(mut self, authority: impl Into<Option<&'a str>>) -> UriResult<Self> {
		match authority.into() {
			Some(authority) => {
				let (user_info, host, port) = split_authority(authority);
				self.user_info = self.prepare_optional(Component::UserInfo, user_info)?;
				self.host = Some(self.prepare(Component::Host, host)?);
				self.port = self.prepare_optional(Component::Port, port.filter(|port| !port.is_empty()))?;
			}
			None => {
				self.user_info = None;
				self.host = None;
				self.port = None;
			}
		}
		Ok(self)
	}

	pub fn user_info<'a>(mut self, user_info: impl Into<Option<&'a str>>) -> UriResult<Self> {
		self.user_info = self.prepare_optional(Component::UserInfo, user_info.into())?;
		Ok(self)
	}

	pub fn host<'a>(mut self, host: impl Into<Option<&'a str>>) -> UriResult<Self> {
		self.host = self.prepare_optional(Component::Host, host.into())?;
		Ok(self)
	}

	/// Sets the port, or unsets it with `None`.
	pub fn port(mut self, port: Option<u16>) -> Self {
		self.port = port.map(|port| Part::literal(port.to_string()));
		self
	}

	/// Replaces the path, including any matrix parameters. `None` clears it.
	pub fn replace_path<'a>(mut self, path: impl Into<Option<&'a str>>) -> UriResult<Self> {
		self.path = match path.into() {
			Some(path) => self.prepare(Component::Path, path)?,
			None => Part::default(),
		};
		Ok(self)
	}

	/// Appends path fragments. A `/` is inserted between fragments only when
	/// neither side supplies one, and a doubled `/` at a join is collapsed.
	///
	/// ```
	/// use waypoint_uri::UriBuilder;
	///
	/// let uri = UriBuilder::from_path("api/")
	///     .unwrap()
	///     .path(&["/users", "{id}"])
	///     .unwrap()
	///     .build_from_values(&["42"])
	///     .unwrap();
	/// assert_eq!(uri.path(), "api/users/42");
	/// ```
	pub fn path<S: AsRef<str>>(mut self, segments: &[S]) -> UriResult<Self> {
		for segment in segments {
			let part = self.prepare(Component::Path, segment.as_ref())?;
			self.append_path(part);
		}
		Ok(self)
	}

	/// Appends the template's path. Literal text is always encoded.
	pub fn path_template(mut self, template: &CompiledTemplate) -> Self {
		let text: String = template
			.segments()
			.iter()
			.map(|segment| match segment {
				Segment::Literal(text) => encode::encode(Component::Path, text).into_owned(),
				Segment::Parameter(param) => param.surface(),
			})
			.collect();
		let mut part = Part::literal(text);
		part.refresh();
		self.append_path(part);
		self
	}

	fn append_path(&mut self, addition: Part) {
		if addition.text.is_empty() {
			return;
		}
		let path = &mut self.path.text;
		match (path.ends_with('/'), addition.text.starts_with('/')) {
			(true, true) => path.push_str(&addition.text[1..]),
			(false, false) if !path.is_empty() => {
				path.push('/');
				path.push_str(&addition.text);
			}
			_ => path.push_str(&addition.text),
		}
		self.path.templated |= addition.templated;
	}

	/// Replaces the matrix parameters of the final path segment with the
	/// `;`-separated `name=value` pairs in `matrix`. `None` or an empty
	/// string removes them.
	pub fn replace_matrix_params<'a>(mut self, matrix: impl Into<Option<&'a str>>) -> UriResult<Self> {
		let stripped = strip_matrix(&self.path.text).len();
		self.path.text.truncate(stripped);
		self.path.refresh();

		if let Some(matrix) = matrix.into() {
			for pair in matrix.split(';').filter(|pair| !pair.is_empty()) {
				let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
				self = self.matrix_param(name, value)?;
			}
		}
		Ok(self)
	}

	/// Appends `;name=value` to the final path segment.
	pub fn matrix_param(mut self, name: &str, value: &str) -> UriResult<Self> {
		let name = self.prepare(Component::MatrixParam, name)?;
		let value = self.prepare(Component::MatrixParam, value)?;
		self.path.text.push(';');
		self.path.text.push_str(&name.text);
		self.path.text.push('=');
		self.path.text.push_str(&value.text);
		self.path.templated |= name.templated || value.templated;
		Ok(self)
	}

	/// Replaces the whole query. `None` or an empty string removes it.
	pub fn replace_query_params<'a>(mut self, query: impl Into<Option<&'a str>>) -> UriResult<Self> {
		self.query = match query.into() {
			Some(query) => self.prepare(Component::Query, query)?,
			None => Part::default(),
		};
		Ok(self)
	}

	/// Appends `name=value` to the query, form encoding both.
	pub fn query_param(mut self, name: &str, value: &str) -> UriResult<Self> {
		let name = self.prepare(Component::QueryParam, name)?;
		let value = self.prepare(Component::QueryParam, value)?;
		if !self.query.text.is_empty() {
			self.query.text.push('&');
		}
		self.query.text.push_str(&name.text);
		self.query.text.push('=');
		self.query.text.push_str(&value.text);
		self.query.templated |= name.templated || value.templated;
		Ok(self)
	}

	pub fn fragment<'a>(mut self, fragment: impl Into<Option<&'a str>>) -> UriResult<Self> {
		self.fragment = self.prepare_optional(Component::Fragment, fragment.into())?;
		Ok(self)
	}

	fn has_authority(&self) -> bool {
		self.user_info.is_some() || self.host.is_some() || self.port.is_some()
	}

	/// Components in URI order, paired with the rules that apply to them.
	fn parts(&self) -> impl Iterator<Item = (Component, &Part)> {
		[
			(Component::Scheme, self.scheme.as_ref()),
			(Component::UserInfo, self.user_info.as_ref()),
			(Component::Host, self.host.as_ref()),
			(Component::Port, self.port.as_ref()),
			(Component::Path, Some(&self.path)),
			(Component::Query, Some(&self.query)),
			(Component::Fragment, self.fragment.as_ref()),
		]
		.into_iter()
		.filter_map(|(component, part)| part.map(|part| (component, part)))
	}

	/// Distinct template parameter names across the whole URI, in the order
	/// positional values are assigned to them.
	///
	/// # Errors
	///
	/// Returns [`UriError::TemplateSyntax`] if a component no longer parses
	/// as a template.
	pub fn parameter_names(&self) -> UriResult<Vec<String>> {
		let mut names: Vec<String> = Vec::new();
		for (_, part) in self.parts().filter(|(_, part)| part.templated) {
			for name in Template::parse(&part.text)?.parameter_names() {
				if !names.iter().any(|n| n == name) {
					names.push(name.to_string());
				}
			}
		}
		Ok(names)
	}

	/// Builds the URI, substituting an empty string for every parameter.
	pub fn build(&self) -> UriResult<Uri> {
		self.assemble(&|_| None, Missing::Empty)
	}

	/// Builds the URI, taking parameter values by name from `values`.
	///
	/// # Errors
	///
	/// Returns [`UriError::IncompleteTemplate`] if a parameter has no value.
	pub fn build_from_map(&self, values: &HashMap<String, String>) -> UriResult<Uri> {
		self.assemble(&|name| values.get(name).cloned(), Missing::Fail)
	}

	/// Builds the URI from `(name, value)` pairs. The first pair for a name
	/// wins.
	pub fn build_with<K: AsRef<str>, V: AsRef<str>>(&self, values: &[(K, V)]) -> UriResult<Uri> {
		self.assemble(
			&|name| {
				values
					.iter()
					.find(|(key, _)| key.as_ref() == name)
					.map(|(_, value)| value.as_ref().to_string())
			},
			Missing::Fail,
		)
	}

	/// Builds the URI from positional values.
	///
	/// Values are assigned to the distinct parameter names in order of first
	/// appearance across the whole URI. Repeated parameters reuse the value
	/// of their first appearance and surplus values are ignored.
	///
	/// ```
	/// use waypoint_uri::UriBuilder;
	///
	/// let builder = UriBuilder::from_path("{a}/{b}/{a}").unwrap();
	/// let uri = builder.build_from_values(&["x", "y", "z"]).unwrap();
	/// assert_eq!(uri.to_string(), "x/y/x");
	/// ```
	pub fn build_from_values<V: AsRef<str>>(&self, values: &[V]) -> UriResult<Uri> {
		let names = self.parameter_names()?;
		if let Some(name) = names.get(values.len()) {
			return Err(UriError::IncompleteTemplate {
				parameter: name.clone(),
			});
		}
		let positional: HashMap<&str, &str> = names
			.iter()
			.map(String::as_str)
			.zip(values.iter().map(|value| value.as_ref()))
			.collect();
		self.assemble(
			&|name| positional.get(name).map(|value| value.to_string()),
			Missing::Fail,
		)
	}

	fn assemble(&self, lookup: &dyn Fn(&str) -> Option<String>, missing: Missing) -> UriResult<Uri> {
		let mut out = String::new();

		if let Some(scheme) = &self.scheme {
			self.render(scheme, Component::Scheme, lookup, missing, &mut out)?;
			out.push(':');
		}

		if self.has_authority() {
			out.push_str("//");
			if let Some(user_info) = &self.user_info {
				self.render(user_info, Component::UserInfo, lookup, missing, &mut out)?;
				out.push('@');
			}
			if let Some(host) = &self.host {
				self.render(host, Component::Host, lookup, missing, &mut out)?;
			}
			if let Some(port) = &self.port {
				out.push(':');
				self.render(port, Component::Port, lookup, missing, &mut out)?;
			}
		}

		let path_start = out.len();
		self.render(&self.path, Component::Path, lookup, missing, &mut out)?;
		if self.has_authority() {
			if out.len() > path_start && !out[path_start..].starts_with('/') {
				out.insert(path_start, '/');
			}
		} else {
			disambiguate_path(&mut out, path_start, self.scheme.is_none());
		}

		if !self.query.text.is_empty() {
			out.push('?');
			self.render(&self.query, Component::Query, lookup, missing, &mut out)?;
		}

		if let Some(fragment) = &self.fragment {
			out.push('#');
			self.render(fragment, Component::Fragment, lookup, missing, &mut out)?;
		}

		let uri = Uri::parse(&out)?;
		tracing::debug!(uri = %uri, "built URI");
		Ok(uri)
	}

	fn render(
		&self,
		part: &Part,
		component: Component,
		lookup: &dyn Fn(&str) -> Option<String>,
		missing: Missing,
		out: &mut String,
	) -> UriResult<()> {
		if !part.templated {
			out.push_str(&part.text);
			return Ok(());
		}

		let mut context = match component {
			Component::Path => Component::PathSegment,
			Component::Query => Component::QueryParam,
			other => other,
		};

		for segment in Template::parse(&part.text)?.segments() {
			match segment {
				Segment::Literal(text) => {
					if component == Component::Path
						&& let Some(boundary) = text.chars().rev().find(|c| matches!(c, '/' | ';'))
					{
						context = if boundary == '/' {
							Component::PathSegment
						} else {
							Component::MatrixParam
						};
					}
					out.push_str(text);
				}
				Segment::Parameter(param) => {
					let value = match (lookup(&param.name), missing) {
						(Some(value), _) => value,
						(None, Missing::Empty) => String::new(),
						(None, Missing::Fail) => {
							return Err(UriError::IncompleteTemplate {
								parameter: param.name.clone(),
							});
						}
					};
					self.push_value(context, &value, out)?;
				}
			}
		}
		Ok(())
	}

	fn push_value(&self, component: Component, value: &str, out: &mut String) -> UriResult<()> {
		let encodable = !matches!(component, Component::Scheme | Component::Port);
		if self.auto_encode && encodable {
			out.push_str(&encode::encode(component, value));
		} else {
			encode::validate(component, value)?;
			out.push_str(value);
		}
		Ok(())
	}
}

/// Keeps a path without an authority from being read back as something
/// else (RFC 3986 section 4.2): a leading `//` would become an authority, and
/// a `:` in the first segment of a relative path would become a scheme.
fn disambiguate_path(out: &mut String, start: usize, relative: bool) {
	if out[start..].starts_with("//") {
		out.insert_str(start, "/.");
		return;
	}
	if !relative {
		return;
	}
	let end = out[start..].find('/').map_or(out.len(), |offset| start + offset);
	if out[start..end].contains(':') {
		let escaped = out[start..end].replace(':', "%3A");
		out.replace_range(start..end, &escaped);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_build_lenient_missing_values() {
		let builder = UriBuilder::from_path("widgets/{id}").unwrap();
		assert_eq!(builder.build().unwrap().to_string(), "widgets/");
	}

	#[rstest]
	fn test_build_from_map_missing_value() {
		let builder = UriBuilder::from_path("widgets/{id}").unwrap();
		let err = builder.build_from_map(&HashMap::new()).unwrap_err();
		assert_eq!(
			err,
			UriError::IncompleteTemplate {
				parameter: "id".to_string()
			}
		);
	}

	#[rstest]
	fn test_positional_too_few_values() {
		let builder = UriBuilder::from_path("{a}/{b}").unwrap();
		let err = builder.build_from_values(&["x"]).unwrap_err();
		assert_eq!(
			err,
			UriError::IncompleteTemplate {
				parameter: "b".to_string()
			}
		);
	}

	#[rstest]
	fn test_positional_order_spans_components() {
		let builder = UriBuilder::from_uri("http://{host}/{p}?q={q}#{f}").unwrap();
		assert_eq!(builder.parameter_names().unwrap(), vec!["host", "p", "q", "f"]);
		let uri = builder
			.build_from_values(&["example.com", "a b", "c&d", "e"])
			.unwrap();
		assert_eq!(uri.to_string(), "http://example.com/a%20b?q=c%26d#e");
	}

	#[rstest]
	#[case("a/b", "x/a%2Fb")]
	#[case("a;b", "x/a%3Bb")]
	#[case("a?b", "x/a%3Fb")]
	#[case("a%2Fb", "x/a%2Fb")]
	#[case("100%", "x/100%25")]
	fn test_path_value_encoding(#[case] value: &str, #[case] expected: &str) {
		let builder = UriBuilder::from_path("x/{v}").unwrap();
		assert_eq!(builder.build_from_values(&[value]).unwrap().to_string(), expected);
	}

	#[rstest]
	fn test_matrix_value_encoding() {
		let builder = UriBuilder::from_path("x")
			.unwrap()
			.matrix_param("m", "{v}")
			.unwrap();
		let uri = builder.build_from_values(&["a=b;c/d"]).unwrap();
		assert_eq!(uri.to_string(), "x;m=a%3Db%3Bc%2Fd");
	}

	#[rstest]
	fn test_literals_encoded_at_set_time() {
		let builder = UriBuilder::from_path("my files/{name}").unwrap();
		let uri = builder.build_with(&[("name", "a")]).unwrap();
		assert_eq!(uri.path(), "my%20files/a");
	}

	#[rstest]
	fn test_encode_off_rejects_illegal_literals() {
		// Arrange
		let builder = UriBuilder::new().encode(false);

		// Act
		let err = builder.replace_path("my files/{name}").unwrap_err();

		// Assert
		assert!(matches!(
			err,
			UriError::InvalidComponent {
				component: Component::Path,
				..
			}
		));
	}

	#[rstest]
	fn test_encode_off_rejects_illegal_values() {
		let builder = UriBuilder::from_path_encoded("x/{v}", false).unwrap();
		let err = builder.build_from_values(&["a b"]).unwrap_err();
		assert!(matches!(
			err,
			UriError::InvalidComponent {
				component: Component::PathSegment,
				..
			}
		));
		assert!(builder.build_from_values(&["a%20b"]).is_ok());
	}

	#[rstest]
	fn test_scheme_is_validated_even_when_encoding() {
		let err = UriBuilder::new().scheme("ht tp").unwrap_err();
		assert!(matches!(
			err,
			UriError::InvalidComponent {
				component: Component::Scheme,
				..
			}
		));
	}

	#[rstest]
	fn test_malformed_result() {
		let builder = UriBuilder::from_uri("{s}://example.com/").unwrap();
		let err = builder.build_from_values(&["1http"]).unwrap_err();
		assert!(matches!(err, UriError::MalformedUri { .. }));
	}

	#[rstest]
	fn test_path_joining() {
		let uri = UriBuilder::from_path("a")
			.unwrap()
			.path(&["b", "/c/", "/d"])
			.unwrap()
			.build()
			.unwrap();
		assert_eq!(uri.path(), "a/b/c/d");
	}

	#[rstest]
	fn test_authority_inserts_leading_slash() {
		let uri = UriBuilder::from_path("a/b")
			.unwrap()
			.host("example.com")
			.unwrap()
			.build()
			.unwrap();
		assert_eq!(uri.to_string(), "//example.com/a/b");
	}

	#[rstest]
	#[case("ab:c", "ab%3Ac/x")]
	#[case("1:2", "1%3A2/x")]
	#[case("plain", "plain/x")]
	fn test_colon_in_leading_relative_segment(#[case] value: &str, #[case] expected: &str) {
		// Arrange
		let template = CompiledTemplate::compile("{a}/x").unwrap();

		// Act
		let uri = UriBuilder::from_template(&template)
			.build_from_values(&[value])
			.unwrap();

		// Assert
		assert_eq!(uri.to_string(), expected);
		assert_eq!(uri.scheme(), None);
		let result = template.matches(uri.path()).unwrap();
		assert_eq!(result.get_decoded("a").unwrap(), value);
	}

	#[rstest]
	fn test_colon_kept_after_first_segment_and_with_scheme() {
		let relative = UriBuilder::from_path("x/{a}").unwrap();
		assert_eq!(relative.build_from_values(&["b:c"]).unwrap().to_string(), "x/b:c");

		let absolute = UriBuilder::from_uri("urn:{a}").unwrap();
		let uri = absolute.build_from_values(&["isbn:0451"]).unwrap();
		assert_eq!(uri.scheme(), Some("urn"));
		assert_eq!(uri.path(), "isbn:0451");
	}

	#[rstest]
	#[case("/{a}/x", "/.//x")]
	#[case("//x", "/.//x")]
	fn test_leading_double_slash_without_authority(#[case] path: &str, #[case] expected: &str) {
		let uri = UriBuilder::from_path(path).unwrap().build().unwrap();
		assert_eq!(uri.to_string(), expected);
		assert_eq!(uri.host(), None);
		assert_eq!(uri.path(), expected);
	}

	#[rstest]
	fn test_literal_percent_encoded_segment_is_kept() {
		// Arrange
		let from_path = UriBuilder::from_path("a%2Fb/{id}").unwrap();
		let appended = UriBuilder::from_path("files")
			.unwrap()
			.path(&["x%2Fy", "{id}"])
			.unwrap();

		// Act
		let first = from_path.build_from_values(&["1"]).unwrap().to_string();
		let second = appended.build_from_values(&["2"]).unwrap().to_string();

		// Assert
		assert_eq!(first, "a%2Fb/1");
		assert_eq!(second, "files/x%2Fy/2");
		assert!(!first.contains("%252F"));
		assert!(!second.contains("%252F"));
	}

	#[rstest]
	fn test_replace_matrix_params() {
		let builder = UriBuilder::from_path("a;x=1/b;y=2;z=3").unwrap();
		let replaced = builder.clone().replace_matrix_params("w=4").unwrap();
		let cleared = builder.replace_matrix_params(None).unwrap();
		assert_eq!(replaced.build().unwrap().path(), "a;x=1/b;w=4");
		assert_eq!(cleared.build().unwrap().path(), "a;x=1/b");
	}

	#[rstest]
	fn test_replace_matrix_params_ignores_template_braces() {
		let builder = UriBuilder::from_path("a/{id:[^;]+};v=1").unwrap();
		let cleared = builder.replace_matrix_params(None).unwrap();
		assert_eq!(cleared.parameter_names().unwrap(), vec!["id"]);
		assert_eq!(cleared.build_from_values(&["7"]).unwrap().path(), "a/7");
	}

	#[rstest]
	fn test_query_params() {
		let builder = UriBuilder::from_path("search")
			.unwrap()
			.query_param("q", "a b")
			.unwrap()
			.query_param("tag", "x&y")
			.unwrap();
		assert_eq!(
			builder.build().unwrap().to_string(),
			"search?q=a+b&tag=x%26y"
		);
		let replaced = builder.replace_query_params("page=2").unwrap();
		assert_eq!(replaced.build().unwrap().query(), Some("page=2"));
		let cleared = replaced.replace_query_params(None).unwrap();
		assert_eq!(cleared.build().unwrap().query(), None);
	}

	#[rstest]
	fn test_clone_is_independent() {
		let original = UriBuilder::from_path("a").unwrap();
		let modified = original.clone().path(&["b"]).unwrap();
		assert_eq!(original.build().unwrap().path(), "a");
		assert_eq!(modified.build().unwrap().path(), "a/b");
	}

	#[rstest]
	fn test_build_is_idempotent() {
		let builder = UriBuilder::from_path("{a}").unwrap();
		let first = builder.build_from_values(&["x"]).unwrap();
		let second = builder.build_from_values(&["x"]).unwrap();
		assert_eq!(first, second);
	}

	#[rstest]
	fn test_uri_copies_defined_components() {
		let base = Uri::parse("https://example.com:8443").unwrap();
		let uri = UriBuilder::from_path("/a")
			.unwrap()
			.fragment("top")
			.unwrap()
			.uri(&base)
			.build()
			.unwrap();
		assert_eq!(uri.to_string(), "https://example.com:8443/a#top");
	}

	#[rstest]
	fn test_scheme_specific_part() {
		let uri = UriBuilder::new()
			.scheme("http")
			.unwrap()
			.scheme_specific_part("//user@example.com:81/p/{x}")
			.unwrap()
			.build_from_values(&["1"])
			.unwrap();
		assert_eq!(uri.to_string(), "http://user@example.com:81/p/1");

		let opaque = UriBuilder::new()
			.scheme("mailto")
			.unwrap()
			.scheme_specific_part("someone@example.com")
			.unwrap()
			.build()
			.unwrap();
		assert_eq!(opaque.to_string(), "mailto:someone@example.com");
	}

	#[rstest]
	fn test_templated_port() {
		let builder = UriBuilder::from_uri("http://localhost:{port}/").unwrap();
		assert_eq!(
			builder.build_from_values(&["8080"]).unwrap().port(),
			Some(8080)
		);
		assert!(matches!(
			builder.build_from_values(&["80a"]),
			Err(UriError::InvalidComponent {
				component: Component::Port,
				..
			})
		));
	}

	#[rstest]
	fn test_port_unset() {
		let uri = UriBuilder::from_uri("http://localhost:8080/x")
			.unwrap()
			.port(None)
			.build()
			.unwrap();
		assert_eq!(uri.to_string(), "http://localhost/x");
	}

	#[rstest]
	fn test_from_template() {
		let template = CompiledTemplate::compile("users/{id}").unwrap();
		let uri = UriBuilder::from_template(&template)
			.build_from_values(&["9"])
			.unwrap();
		assert_eq!(uri.path(), "users/9");
	}

	#[rstest]
	fn test_split_authority() {
		assert_eq!(split_authority("u@h:1"), (Some("u"), "h", Some("1")));
		assert_eq!(split_authority("[::1]:80"), (None, "[::1]", Some("80")));
		assert_eq!(split_authority("[::1]"), (None, "[::1]", None));
		assert_eq!(
			split_authority("{h:[a-z:]+}"),
			(None, "{h:[a-z:]+}", None)
		);
	}
}
