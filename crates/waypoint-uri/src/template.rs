//! URI template parsing and compilation.
//!
//! A template is a string with embedded parameters of the form
//!
//! ```text
//! param = "{" *WSP name *WSP [ ":" *WSP regex *WSP ] "}"
//! name  = (ALPHA / DIGIT / "_") *(ALPHA / DIGIT / "." / "_" / "-")
//! ```
//!
//! When no regex is supplied the parameter uses [`DEFAULT_PATTERN`], which
//! stops at a path segment boundary. A custom regex may deliberately cross
//! segment boundaries; it is never anchored to a single segment, so a
//! pattern like `{path:.*}` captures `a/b/c` whole.
//!
//! The same name may appear several times. Only the first occurrence's
//! pattern is authoritative, and every occurrence must capture the same
//! text for a match to succeed.

use crate::config::UriConfig;
use crate::error::{UriError, UriResult};
use regex::{Regex, RegexBuilder};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Pattern used for parameters that do not declare their own regex.
pub const DEFAULT_PATTERN: &str = "[^/]+";

/// A template parameter occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
	/// The parameter name.
	pub name: String,
	/// The capturing-group body declared for this occurrence.
	pub pattern: String,
	/// Whether `pattern` is [`DEFAULT_PATTERN`] because none was declared.
	pub is_default_pattern: bool,
}

impl Parameter {
	/// Renders the occurrence the way it is written in a template.
	pub fn surface(&self) -> String {
		if self.is_default_pattern {
			format!("{{{}}}", self.name)
		} else {
			format!("{{{}:{}}}", self.name, self.pattern)
		}
	}
}

/// One piece of a parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
	Literal(String),
	Parameter(Parameter),
}

impl Segment {
	/// The text this segment contributes to the template.
	pub fn surface(&self) -> String {
		match self {
			Self::Literal(text) => text.clone(),
			Self::Parameter(param) => param.surface(),
		}
	}
}

/// A parsed, syntax-checked template.
///
/// Parsing only validates braces and names; regexes are checked by
/// [`CompiledTemplate::compile`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
	source: String,
	segments: Vec<Segment>,
}

fn is_valid_name(name: &str) -> bool {
	let mut chars = name.chars();
	match chars.next() {
		Some(first) if first.is_ascii_alphanumeric() || first == '_' => {}
		_ => return false,
	}
	chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
}

impl Template {
	/// Splits a template into literal and parameter segments.
	///
	/// # Examples
	///
	/// ```
	/// use waypoint_uri::template::{Segment, Template};
	///
	/// let template = Template::parse("widgets/{ id : \\d+ }").unwrap();
	/// assert_eq!(template.segments().len(), 2);
	/// assert_eq!(template.segments()[0], Segment::Literal("widgets/".to_string()));
	/// assert_eq!(template.parameter_names(), vec!["id"]);
	///
	/// assert!(Template::parse("widgets/{id").is_err());
	/// assert!(Template::parse("widgets/id}").is_err());
	/// ```
	pub fn parse(source: &str) -> UriResult<Self> {
		let mut segments = Vec::new();
		let mut literal = String::new();
		let mut chars = source.chars();

		while let Some(c) = chars.next() {
			match c {
				'{' => {
					if !literal.is_empty() {
						segments.push(Segment::Literal(std::mem::take(&mut literal)));
					}
					let token = Self::read_parameter(source, &mut chars)?;
					segments.push(Segment::Parameter(Self::parse_parameter(source, &token)?));
				}
				'}' => {
					return Err(UriError::syntax(source, "unmatched '}'"));
				}
				_ => literal.push(c),
			}
		}

		if !literal.is_empty() {
			segments.push(Segment::Literal(literal));
		}

		Ok(Self {
			source: source.to_string(),
			segments,
		})
	}

	/// Reads the body of a `{...}` token, the opening brace already consumed.
	///
	/// Braces are only permitted inside the regex part, where they must
	/// balance (e.g. `\d{2,4}`).
	fn read_parameter(source: &str, chars: &mut std::str::Chars<'_>) -> UriResult<String> {
		let mut token = String::new();
		let mut in_regex = false;
		let mut depth = 0usize;

		for c in chars.by_ref() {
			match c {
				'{' if !in_regex => {
					return Err(UriError::syntax(source, "nested '{' in parameter name"));
				}
				'{' => depth += 1,
				'}' if depth == 0 => return Ok(token),
				'}' => depth -= 1,
				':' => in_regex = true,
				_ => {}
			}
			token.push(c);
		}

		Err(UriError::syntax(source, "unclosed '{'"))
	}

	fn parse_parameter(source: &str, token: &str) -> UriResult<Parameter> {
		let (name, pattern) = match token.split_once(':') {
			Some((name, regex)) => (name.trim(), Some(regex.trim())),
			None => (token.trim(), None),
		};

		if name.is_empty() {
			return Err(UriError::syntax(source, "empty parameter name"));
		}
		if !is_valid_name(name) {
			return Err(UriError::syntax(
				source,
				format!("invalid parameter name '{}'", name),
			));
		}

		match pattern {
			Some("") => Err(UriError::syntax(
				source,
				format!("empty regular expression for parameter '{}'", name),
			)),
			Some(regex) => Ok(Parameter {
				name: name.to_string(),
				pattern: regex.to_string(),
				is_default_pattern: false,
			}),
			None => Ok(Parameter {
				name: name.to_string(),
				pattern: DEFAULT_PATTERN.to_string(),
				is_default_pattern: true,
			}),
		}
	}

	/// The string the template was parsed from.
	pub fn source(&self) -> &str {
		&self.source
	}

	pub fn segments(&self) -> &[Segment] {
		&self.segments
	}

	/// All parameter occurrences in template order, repeats included.
	pub fn parameters(&self) -> impl Iterator<Item = &Parameter> {
		self.segments.iter().filter_map(|segment| match segment {
			Segment::Parameter(param) => Some(param),
			Segment::Literal(_) => None,
		})
	}

	/// Distinct parameter names in first-occurrence order.
	pub fn parameter_names(&self) -> Vec<&str> {
		let mut names: Vec<&str> = Vec::new();
		for param in self.parameters() {
			if !names.contains(&param.name.as_str()) {
				names.push(&param.name);
			}
		}
		names
	}

	pub fn has_parameters(&self) -> bool {
		self.parameters().next().is_some()
	}

	/// Concatenates the surface form of every segment.
	pub fn render(&self) -> String {
		self.segments.iter().map(Segment::surface).collect()
	}
}

impl fmt::Display for Template {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.source)
	}
}

/// Capture group bookkeeping for one parameter occurrence.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Occurrence {
	/// Index into the distinct name list.
	pub(crate) ordinal: usize,
	/// Capture group number in the compiled regex.
	pub(crate) group: usize,
}

#[derive(Debug)]
pub(crate) struct CompiledInner {
	pub(crate) template: Template,
	pub(crate) regex: Regex,
	/// Same body as `regex` followed by a `(/.*)?` remainder group.
	pub(crate) prefix_regex: Regex,
	pub(crate) names: Vec<String>,
	pub(crate) ordinals: HashMap<String, usize>,
	pub(crate) occurrences: Vec<Occurrence>,
	pub(crate) literal_chars: usize,
	pub(crate) custom_patterns: usize,
}

/// A template together with its matching regex.
///
/// Compiled templates are immutable and cheap to clone; clones share the
/// compiled regex and can be used from any number of threads.
///
/// # Examples
///
/// ```
/// use waypoint_uri::CompiledTemplate;
///
/// let template = CompiledTemplate::compile("{a}/{b}/{a}").unwrap();
/// assert_eq!(template.parameter_names(), &["a", "b"]);
/// assert_eq!(template.regex(), "^([^/]+)/([^/]+)/([^/]+)$");
/// ```
#[derive(Debug, Clone)]
pub struct CompiledTemplate {
	pub(crate) inner: Arc<CompiledInner>,
}

impl CompiledTemplate {
	/// Compiles a template with the default configuration.
	pub fn compile(template: &str) -> UriResult<Self> {
		Self::compile_with(template, &UriConfig::default())
	}

	/// Compiles a template, enforcing the limits of `config`.
	///
	/// # Errors
	///
	/// Returns [`UriError::TemplateSyntax`] if the template is too long, is
	/// syntactically malformed, or declares a regex that does not compile.
	pub fn compile_with(template: &str, config: &UriConfig) -> UriResult<Self> {
		if template.len() > config.max_template_length {
			return Err(UriError::syntax(
				template,
				format!(
					"template length {} exceeds maximum allowed length of {} bytes",
					template.len(),
					config.max_template_length
				),
			));
		}

		let parsed = Template::parse(template)?;

		let mut body = String::with_capacity(template.len() * 2);
		let mut names: Vec<String> = Vec::new();
		let mut ordinals: HashMap<String, usize> = HashMap::new();
		let mut canonical: Vec<String> = Vec::new();
		let mut inner_groups: Vec<usize> = Vec::new();
		let mut occurrences = Vec::new();
		let mut literal_chars = 0;
		let mut custom_patterns = 0;
		let mut next_group = 1;

		for segment in parsed.segments() {
			match segment {
				Segment::Literal(text) => {
					literal_chars += text.chars().count();
					body.push_str(&regex::escape(text));
				}
				Segment::Parameter(param) => {
					let ordinal = match ordinals.get(&param.name) {
						Some(&ordinal) => {
							if canonical[ordinal] != param.pattern && !param.is_default_pattern {
								tracing::debug!(
									template = %template,
									parameter = %param.name,
									"ignoring pattern of repeated template parameter"
								);
							}
							ordinal
						}
						None => {
							if !param.is_default_pattern {
								custom_patterns += 1;
							}
							let ordinal = names.len();
							inner_groups.push(Self::inner_group_count(template, &param.pattern)?);
							names.push(param.name.clone());
							ordinals.insert(param.name.clone(), ordinal);
							canonical.push(param.pattern.clone());
							ordinal
						}
					};

					// Repeats reuse the first pattern, so they open the same number of groups
					occurrences.push(Occurrence {
						ordinal,
						group: next_group,
					});
					next_group += 1 + inner_groups[ordinal];
					body.push('(');
					body.push_str(&canonical[ordinal]);
					body.push(')');
				}
			}
		}

		let regex = Self::build_regex(template, &format!("^{}$", body), config)?;
		let prefix_body = Self::prefix_body(&parsed, &canonical, &ordinals);
		let prefix_regex = Self::build_regex(template, &format!("^{}(/.*)?$", prefix_body), config)?;

		tracing::debug!(
			template = %template,
			regex = %regex.as_str(),
			parameters = names.len(),
			"compiled URI template"
		);

		Ok(Self {
			inner: Arc::new(CompiledInner {
				template: parsed,
				regex,
				prefix_regex,
				names,
				ordinals,
				occurrences,
				literal_chars,
				custom_patterns,
			}),
		})
	}

	/// Counts capturing groups declared inside a parameter regex, checking
	/// that the regex compiles on its own.
	fn inner_group_count(template: &str, pattern: &str) -> UriResult<usize> {
		let regex = Regex::new(&format!("^(?:{})$", pattern)).map_err(|e| {
			UriError::syntax(template, format!("invalid regular expression '{}': {}", pattern, e))
		})?;
		Ok(regex.captures_len() - 1)
	}

	fn build_regex(template: &str, source: &str, config: &UriConfig) -> UriResult<Regex> {
		RegexBuilder::new(source)
			.size_limit(config.regex_size_limit)
			.build()
			.map_err(|e| UriError::syntax(template, format!("failed to compile pattern regex: {}", e)))
	}

	/// Regex body used for prefix matching: identical to the full body but
	/// with a trailing `/` dropped, so `widgets/` still prefixes `widgets/12`.
	fn prefix_body(
		parsed: &Template,
		canonical: &[String],
		ordinals: &HashMap<String, usize>,
	) -> String {
		let mut body = String::new();
		let last = parsed.segments().len().saturating_sub(1);
		for (index, segment) in parsed.segments().iter().enumerate() {
			match segment {
				Segment::Literal(text) => {
					let text = if index == last {
						text.strip_suffix('/').unwrap_or(text)
					} else {
						text.as_str()
					};
					body.push_str(&regex::escape(text));
				}
				Segment::Parameter(param) => {
					body.push('(');
					body.push_str(&canonical[ordinals[&param.name]]);
					body.push(')');
				}
			}
		}
		body
	}

	/// The original template string.
	pub fn template(&self) -> &str {
		self.inner.template.source()
	}

	/// The parsed segments.
	pub fn segments(&self) -> &[Segment] {
		self.inner.template.segments()
	}

	/// Distinct parameter names in first-occurrence order.
	pub fn parameter_names(&self) -> &[String] {
		&self.inner.names
	}

	/// Position of `name` among the distinct parameter names.
	pub fn ordinal(&self, name: &str) -> Option<usize> {
		self.inner.ordinals.get(name).copied()
	}

	/// The anchored regex used for matching.
	pub fn regex(&self) -> &str {
		self.inner.regex.as_str()
	}

	/// Number of literal characters, used to rank templates.
	pub fn literal_chars(&self) -> usize {
		self.inner.literal_chars
	}

	/// Number of distinct parameters.
	pub fn parameter_count(&self) -> usize {
		self.inner.names.len()
	}

	/// Number of distinct parameters that declare their own regex.
	pub fn custom_pattern_count(&self) -> usize {
		self.inner.custom_patterns
	}

	/// Whether the template has no parameters at all.
	pub fn is_literal(&self) -> bool {
		self.inner.names.is_empty()
	}
}

impl PartialEq for CompiledTemplate {
	fn eq(&self, other: &Self) -> bool {
		self.template() == other.template()
	}
}

impl Eq for CompiledTemplate {}

impl fmt::Display for CompiledTemplate {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.template())
	}
}
