//! Integration test utilities for Waypoint
//!
//! [`Resources`] wires the crates together the way a resource framework
//! would: a route table picks the resource, its parameter declarations are
//! bound, a representation is negotiated and conditional headers are
//! checked against the resource validators.

use chrono::{DateTime, Utc};
use http::header::{HeaderName, IF_MATCH, IF_MODIFIED_SINCE, IF_NONE_MATCH, IF_UNMODIFIED_SINCE};
use http::{HeaderMap, HeaderValue, Method};
use waypoint_http::{
	AcceptVariantSelector, EntityTag, HttpError, Precondition, Preconditions, ResponseDescriptor,
	Selection, Variant, VariantListBuilder, VariantSelector, parse_http_date,
};
use waypoint_params::{Binder, BoundParams, Kind, ParamError, ParamSpec};
use waypoint_uri::{BuilderRegistry, RouteTable, Uri, UriConfig, UriError};

/// Validators of the product resource: 2024-01-01T00:00:00Z.
pub const PRODUCT_LAST_MODIFIED: i64 = 1_704_067_200;

/// A resource as a framework would register it.
pub struct Resource {
	pub name: &'static str,
	pub params: Binder,
	pub variants: Vec<Variant>,
	pub etag: Option<EntityTag>,
	pub last_modified: Option<DateTime<Utc>>,
}

/// A request as seen by the dispatcher.
#[derive(Debug, Clone)]
pub struct TestRequest {
	pub method: Method,
	pub uri: String,
	pub headers: HeaderMap,
}

impl TestRequest {
	pub fn get(uri: &str) -> Self {
		Self {
			method: Method::GET,
			uri: uri.to_string(),
			headers: HeaderMap::new(),
		}
	}

	pub fn with_method(mut self, method: Method) -> Self {
		self.method = method;
		self
	}

	/// Appends a header. Panics on invalid header text.
	pub fn header(mut self, name: HeaderName, value: &str) -> Self {
		let value = HeaderValue::from_str(value).unwrap_or_else(|e| panic!("invalid header {name}: {e}"));
		self.headers.append(name, value);
		self
	}
}

/// Result of dispatching a request.
#[derive(Debug)]
pub enum Outcome {
	/// The resource handler would run with these inputs.
	Handled {
		resource: &'static str,
		params: BoundParams,
		selection: Option<Selection>,
	},
	/// A response produced before reaching the handler.
	Respond(ResponseDescriptor),
}

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
	#[error("No resource matches '{0}'")]
	NotFound(String),
	#[error(transparent)]
	Params(#[from] ParamError),
	#[error(transparent)]
	Http(#[from] HttpError),
	#[error(transparent)]
	Uri(#[from] UriError),
}

/// The test application: a catalog of products, a search endpoint and a
/// file tree.
pub struct Resources {
	routes: RouteTable<Resource>,
	registry: BuilderRegistry,
}

impl Resources {
	pub fn new() -> Result<Self, DispatchError> {
		let registry = BuilderRegistry::init(UriConfig::default());
		let mut routes = RouteTable::new();

		let product_variants = VariantListBuilder::new()
			.media_types(["application/json", "text/html"])
			.languages(["en", "de"])
			.build();
		let product_modified = DateTime::<Utc>::from_timestamp(PRODUCT_LAST_MODIFIED, 0).unwrap_or_default();

		for (name, template, resource) in [
			(
				"product",
				"products/{sku}",
				Resource {
					name: "product",
					params: Binder::new(vec![
						ParamSpec::path("sku"),
						ParamSpec::matrix("color"),
						ParamSpec::query("qty").kind(Kind::Int).default_value("1"),
					]),
					variants: product_variants,
					etag: Some(EntityTag::strong("product-v3")),
					last_modified: Some(product_modified),
				},
			),
			(
				"search",
				"search",
				Resource {
					name: "search",
					params: Binder::new(vec![
						ParamSpec::query("q"),
						ParamSpec::query("tag").kind(Kind::list(Kind::Text)),
						ParamSpec::query("page").kind(Kind::Int).default_value("1"),
					]),
					variants: vec![Variant::default().with_media_type("application/json")],
					etag: None,
					last_modified: None,
				},
			),
			(
				"file",
				"files/{path:.+}",
				Resource {
					name: "file",
					params: Binder::new(vec![ParamSpec::path("path").encoded(true)]),
					variants: Vec::new(),
					etag: None,
					last_modified: None,
				},
			),
		] {
			routes.named_route(name, template, resource)?;
			registry.register_resource(name, template)?;
		}

		Ok(Self { routes, registry })
	}

	pub fn dispatch(&self, request: &TestRequest) -> Result<Outcome, DispatchError> {
		let path = request.uri.split(['?', '#']).next().unwrap_or_default();
		let found = self
			.routes
			.match_path(path)
			.ok_or_else(|| DispatchError::NotFound(path.to_string()))?;
		let resource = found.value();

		let data = waypoint_params::RequestData::from_uri(&request.uri, &found.params).with_headers(&request.headers);
		let params = resource.params.bind(&data)?;

		let selection = if resource.variants.is_empty() {
			None
		} else {
			Some(AcceptVariantSelector::from_headers(&request.headers)?.select_variant(&resource.variants)?)
		};

		let preconditions = HeaderPreconditions::from_request(request)?;
		let outcome = match (&resource.etag, resource.last_modified) {
			(Some(etag), Some(last_modified)) => preconditions.evaluate(last_modified, etag),
			(Some(etag), None) => preconditions.evaluate_etag(etag),
			(None, Some(last_modified)) => preconditions.evaluate_last_modified(last_modified),
			(None, None) => Precondition::Proceed,
		};
		if let Precondition::Respond(response) = outcome {
			let vary = selection.map(|s| s.vary).unwrap_or_default();
			return Ok(Outcome::Respond(response.with_vary(&vary)));
		}

		tracing::debug!(resource = resource.name, "dispatched request");
		Ok(Outcome::Handled {
			resource: resource.name,
			params,
			selection,
		})
	}

	/// Builds a link to a registered resource.
	pub fn link(&self, name: &str, values: &[(&str, &str)]) -> Result<Uri, DispatchError> {
		Ok(self.registry.from_resource(name)?.build_with(values)?)
	}

	pub fn registry(&self) -> &BuilderRegistry {
		&self.registry
	}
}

/// Conditional request headers, evaluated the way RFC 9110 orders them.
#[derive(Debug, Clone)]
pub struct HeaderPreconditions {
	method: Method,
	/// `None` when absent, `Some(None)` for `*`.
	if_match: Option<Option<Vec<EntityTag>>>,
	if_none_match: Option<Option<Vec<EntityTag>>>,
	if_modified_since: Option<DateTime<Utc>>,
	if_unmodified_since: Option<DateTime<Utc>>,
}

impl HeaderPreconditions {
	pub fn from_request(request: &TestRequest) -> Result<Self, HttpError> {
		let text = |name: HeaderName| -> Result<Option<&str>, HttpError> {
			request
				.headers
				.get(&name)
				.map(|value| value.to_str().map_err(|_| HttpError::InvalidHeader(name.to_string())))
				.transpose()
		};

		Ok(Self {
			method: request.method.clone(),
			if_match: text(IF_MATCH)?.map(EntityTag::parse_list).transpose()?,
			if_none_match: text(IF_NONE_MATCH)?.map(EntityTag::parse_list).transpose()?,
			if_modified_since: text(IF_MODIFIED_SINCE)?.and_then(parse_http_date),
			if_unmodified_since: text(IF_UNMODIFIED_SINCE)?.and_then(parse_http_date),
		})
	}

	fn is_safe(&self) -> bool {
		self.method == Method::GET || self.method == Method::HEAD
	}
}

impl Preconditions for HeaderPreconditions {
	fn method(&self) -> &Method {
		&self.method
	}

	fn evaluate_etag(&self, etag: &EntityTag) -> Precondition {
		if let Some(if_match) = &self.if_match {
			let matched = if_match.as_ref().is_none_or(|tags| tags.iter().any(|tag| tag.strong_eq(etag)));
			if !matched {
				return Precondition::Respond(ResponseDescriptor::precondition_failed(etag));
			}
		}

		if let Some(if_none_match) = &self.if_none_match {
			let matched = if_none_match.as_ref().is_none_or(|tags| tags.iter().any(|tag| tag.weak_eq(etag)));
			if matched {
				let response = if self.is_safe() {
					ResponseDescriptor::not_modified(etag)
				} else {
					ResponseDescriptor::precondition_failed(etag)
				};
				return Precondition::Respond(response);
			}
		}

		Precondition::Proceed
	}

	fn evaluate_last_modified(&self, last_modified: DateTime<Utc>) -> Precondition {
		let seconds = last_modified.timestamp();

		if self.if_match.is_none()
			&& let Some(since) = self.if_unmodified_since
			&& seconds > since.timestamp()
		{
			return Precondition::Respond(
				ResponseDescriptor::new(http::StatusCode::PRECONDITION_FAILED).with_last_modified(last_modified),
			);
		}

		if self.if_none_match.is_none()
			&& self.is_safe()
			&& let Some(since) = self.if_modified_since
			&& seconds <= since.timestamp()
		{
			return Precondition::Respond(
				ResponseDescriptor::new(http::StatusCode::NOT_MODIFIED).with_last_modified(last_modified),
			);
		}

		Precondition::Proceed
	}

	fn evaluate(&self, last_modified: DateTime<Utc>, etag: &EntityTag) -> Precondition {
		match self.evaluate_etag(etag) {
			Precondition::Proceed => match self.evaluate_last_modified(last_modified) {
				Precondition::Respond(response) => Precondition::Respond(response.with_etag(etag)),
				Precondition::Proceed => Precondition::Proceed,
			},
			Precondition::Respond(response) => Precondition::Respond(response.with_last_modified(last_modified)),
		}
	}
}
