//! Ordered template routing.
//!
//! Templates are registered relative to the application root: a leading
//! `/` is ignored, both on templates and on the paths being resolved.
//! When several templates match a path the most specific wins:
//!
//! 1. more literal characters,
//! 2. then more parameters,
//! 3. then more parameters with a custom regex,
//! 4. then earlier registration.

use crate::builder::UriBuilder;
use crate::config::UriConfig;
use crate::error::{UriError, UriResult};
use crate::matcher::MatchResult;
use crate::template::CompiledTemplate;
use crate::uri::Uri;
use std::cmp::Reverse;

/// Joins a base template and a child template the way nested resource
/// paths combine: the base is treated as if it ended with `/`, and a
/// leading `/` on either side is ignored.
///
/// # Examples
///
/// ```
/// use waypoint_uri::router::join;
///
/// assert_eq!(join("users", "{id}"), "users/{id}");
/// assert_eq!(join("/users/", "/{id}"), "users/{id}");
/// assert_eq!(join("users", ""), "users");
/// assert_eq!(join("", "users"), "users");
/// ```
pub fn join(base: &str, child: &str) -> String {
	let base = base.trim_start_matches('/');
	let child = child.trim_start_matches('/');
	match (base.is_empty(), child.is_empty()) {
		(_, true) => base.to_string(),
		(true, false) => child.to_string(),
		(false, false) if base.ends_with('/') => format!("{}{}", base, child),
		(false, false) => format!("{}/{}", base, child),
	}
}

/// A registered template and the value it routes to.
#[derive(Debug, Clone)]
pub struct Route<T> {
	template: CompiledTemplate,
	name: Option<String>,
	value: T,
	order: usize,
}

impl<T> Route<T> {
	pub fn template(&self) -> &CompiledTemplate {
		&self.template
	}

	/// The name used for reverse lookups, if any.
	pub fn name(&self) -> Option<&str> {
		self.name.as_deref()
	}

	pub fn value(&self) -> &T {
		&self.value
	}

	/// Position in registration order.
	pub fn order(&self) -> usize {
		self.order
	}

	fn precedence(&self) -> (Reverse<usize>, Reverse<usize>, Reverse<usize>, usize) {
		(
			Reverse(self.template.literal_chars()),
			Reverse(self.template.parameter_count()),
			Reverse(self.template.custom_pattern_count()),
			self.order,
		)
	}
}

/// A resolved route together with the captured parameters.
#[derive(Debug, Clone)]
pub struct RouteMatch<'r, T> {
	/// The route that matched.
	pub route: &'r Route<T>,
	/// Values captured from the path.
	pub params: MatchResult,
	/// Unmatched remainder for prefix matches; empty for full matches.
	pub remainder: String,
}

impl<T> RouteMatch<'_, T> {
	pub fn value(&self) -> &T {
		&self.route.value
	}

	/// The encoded value captured for `name`.
	pub fn param(&self, name: &str) -> Option<&str> {
		self.params.get(name)
	}
}

/// Templates kept in precedence order.
///
/// # Examples
///
/// ```
/// use waypoint_uri::RouteTable;
///
/// let mut table = RouteTable::new();
/// table.route("users/{id}", "user-detail").unwrap();
/// table.route("users/me", "current-user").unwrap();
///
/// let found = table.match_path("/users/me").unwrap();
/// assert_eq!(*found.value(), "current-user");
///
/// let found = table.match_path("/users/42").unwrap();
/// assert_eq!(*found.value(), "user-detail");
/// assert_eq!(found.param("id"), Some("42"));
/// ```
#[derive(Debug, Clone)]
pub struct RouteTable<T> {
	routes: Vec<Route<T>>,
	config: UriConfig,
	registered: usize,
}

impl<T> Default for RouteTable<T> {
	fn default() -> Self {
		Self::new()
	}
}

impl<T> RouteTable<T> {
	pub fn new() -> Self {
		Self::with_config(UriConfig::default())
	}

	/// Creates an empty table whose templates are compiled with `config`.
	pub fn with_config(config: UriConfig) -> Self {
		Self {
			routes: Vec::new(),
			config,
			registered: 0,
		}
	}

	/// Registers an unnamed route.
	pub fn route(&mut self, template: &str, value: T) -> UriResult<&mut Self> {
		self.insert(None, template, value)
	}

	/// Registers a route that can also be looked up by name.
	pub fn named_route(&mut self, name: &str, template: &str, value: T) -> UriResult<&mut Self> {
		self.insert(Some(name.to_string()), template, value)
	}

	/// Registers `child` under `base`, see [`join`].
	pub fn nested_route(&mut self, base: &str, child: &str, value: T) -> UriResult<&mut Self> {
		self.insert(None, &join(base, child), value)
	}

	/// Registers an already compiled template. A leading `/` is kept as is.
	pub fn compiled_route(&mut self, name: Option<&str>, template: CompiledTemplate, value: T) -> &mut Self {
		let route = Route {
			template,
			name: name.map(str::to_string),
			value,
			order: self.registered,
		};
		self.registered += 1;

		tracing::debug!(
			template = %route.template,
			name = ?route.name,
			"registered route"
		);

		let position = self
			.routes
			.partition_point(|existing| existing.precedence() <= route.precedence());
		self.routes.insert(position, route);
		self
	}

	fn insert(&mut self, name: Option<String>, template: &str, value: T) -> UriResult<&mut Self> {
		let template = CompiledTemplate::compile_with(template.trim_start_matches('/'), &self.config)?;
		Ok(self.compiled_route(name.as_deref(), template, value))
	}

	/// Routes in precedence order.
	pub fn routes(&self) -> impl Iterator<Item = &Route<T>> {
		self.routes.iter()
	}

	pub fn route_count(&self) -> usize {
		self.routes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.routes.is_empty()
	}

	pub fn has_route(&self, name: &str) -> bool {
		self.routes.iter().any(|route| route.name() == Some(name))
	}

	/// Finds the most specific route matching the whole path.
	pub fn match_path(&self, path: &str) -> Option<RouteMatch<'_, T>> {
		let path = path.trim_start_matches('/');
		let found = self.routes.iter().find_map(|route| {
			route.template.matches(path).map(|params| RouteMatch {
				route,
				params,
				remainder: String::new(),
			})
		});
		if found.is_none() {
			tracing::trace!(path = %path, "no route matched");
		}
		found
	}

	/// Finds the most specific route matching a leading portion of the path
	/// that ends at a segment boundary.
	pub fn match_prefix(&self, path: &str) -> Option<RouteMatch<'_, T>> {
		let path = path.trim_start_matches('/');
		self.routes.iter().find_map(|route| {
			route
				.template
				.match_prefix(path)
				.map(|(params, remainder)| RouteMatch {
					route,
					params,
					remainder: remainder.to_string(),
				})
		})
	}

	/// Builds the path of the route registered as `name`.
	pub fn reverse(&self, name: &str, params: &[(&str, &str)]) -> UriResult<Uri> {
		let route = self
			.routes
			.iter()
			.find(|route| route.name() == Some(name))
			.ok_or_else(|| UriError::UnknownResource(name.to_string()))?;
		UriBuilder::with_config(&self.config)
			.path_template(&route.template)
			.build_with(params)
	}
}
