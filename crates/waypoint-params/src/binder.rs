//! Resolving declared parameters against request data.

use crate::error::{ParamError, ParamResult};
use crate::request::RequestData;
use crate::param::{Kind, ParamSpec, Source};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use waypoint_uri::encode;

/// A converted parameter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
	Bool(bool),
	Int(i64),
	Float(f64),
	Text(String),
	List(Vec<ParamValue>),
	/// An optional parameter the request did not supply.
	Absent,
}

impl ParamValue {
	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::Text(value) => Some(value),
			_ => None,
		}
	}

	pub fn as_int(&self) -> Option<i64> {
		match self {
			Self::Int(value) => Some(*value),
			_ => None,
		}
	}

	pub fn as_float(&self) -> Option<f64> {
		match self {
			Self::Float(value) => Some(*value),
			_ => None,
		}
	}

	pub fn as_bool(&self) -> Option<bool> {
		match self {
			Self::Bool(value) => Some(*value),
			_ => None,
		}
	}

	pub fn as_list(&self) -> Option<&[ParamValue]> {
		match self {
			Self::List(values) => Some(values),
			_ => None,
		}
	}

	pub fn is_absent(&self) -> bool {
		matches!(self, Self::Absent)
	}
}

/// Bound values in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BoundParams {
	values: Vec<(String, ParamValue)>,
}

impl BoundParams {
	/// The value bound for the first declaration named `name`.
	pub fn get(&self, name: &str) -> Option<&ParamValue> {
		self.values
			.iter()
			.find(|(key, _)| key == name)
			.map(|(_, value)| value)
	}

	pub fn len(&self) -> usize {
		self.values.len()
	}

	pub fn is_empty(&self) -> bool {
		self.values.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
		self.values.iter().map(|(name, value)| (name.as_str(), value))
	}
}

/// Binds a route's declared parameters.
///
/// Values are percent-decoded unless the declaration is `encoded`: path
/// and matrix values with plain decoding, query values with form decoding
/// (`+` is a space). Header and cookie values are taken as sent. Scalar
/// kinds use the first value; [`Kind::List`] collects every value.
///
/// A missing value falls back to the declared default. Without one, a
/// path parameter is an error, a list is empty and any other scalar binds
/// to [`ParamValue::Absent`].
///
/// # Examples
///
/// ```
/// use waypoint_params::{Binder, Kind, ParamSpec, ParamValue, RequestData};
/// use waypoint_uri::CompiledTemplate;
///
/// let template = CompiledTemplate::compile("users/{id}").unwrap();
/// let matched = template.matches("users/7").unwrap();
/// let request = RequestData::from_uri("/users/7?q=a+b", &matched);
///
/// let binder = Binder::new(vec![
///     ParamSpec::path("id").kind(Kind::Int),
///     ParamSpec::query("q"),
///     ParamSpec::query("page").kind(Kind::Int).default_value("1"),
/// ]);
/// let params = binder.bind(&request).unwrap();
///
/// assert_eq!(params.get("id"), Some(&ParamValue::Int(7)));
/// assert_eq!(params.get("q").and_then(ParamValue::as_str), Some("a b"));
/// assert_eq!(params.get("page"), Some(&ParamValue::Int(1)));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Binder {
	specs: Vec<ParamSpec>,
}

impl Binder {
	pub fn new(specs: Vec<ParamSpec>) -> Self {
		Self { specs }
	}

	pub fn specs(&self) -> &[ParamSpec] {
		&self.specs
	}

	/// Binds every declared parameter, stopping at the first failure.
	pub fn bind(&self, request: &RequestData) -> ParamResult<BoundParams> {
		let values = self
			.specs
			.iter()
			.map(|spec| Ok((spec.name.clone(), bind_one(spec, request)?)))
			.collect::<ParamResult<Vec<_>>>()?;

		tracing::debug!(count = values.len(), "bound request parameters");
		Ok(BoundParams { values })
	}
}

fn bind_one(spec: &ParamSpec, request: &RequestData) -> ParamResult<ParamValue> {
	let raw = request.values(spec.source, &spec.name);
	let decoded: Vec<Cow<'_, str>> = raw.into_iter().map(|value| decode(spec, value)).collect();

	let value = match &spec.kind {
		Kind::List(inner) => {
			let items: Vec<&str> = if decoded.is_empty() {
				spec.default.as_deref().into_iter().collect()
			} else {
				decoded.iter().map(|value| value.as_ref()).collect()
			};
			let items = items
				.into_iter()
				.map(|item| convert(spec, inner, item))
				.collect::<ParamResult<Vec<_>>>()?;
			ParamValue::List(items)
		}
		kind => match decoded.first().map(|value| value.as_ref()).or(spec.default.as_deref()) {
			Some(value) => convert(spec, kind, value)?,
			None if spec.source == Source::Path => {
				tracing::debug!(name = %spec.name, "missing path parameter");
				return Err(ParamError::Missing {
					name: spec.name.clone(),
					location: spec.source,
				});
			}
			None => ParamValue::Absent,
		},
	};

	tracing::trace!(name = %spec.name, source = %spec.source, value = ?value, "resolved parameter");
	Ok(value)
}

fn decode<'a>(spec: &ParamSpec, value: &'a str) -> Cow<'a, str> {
	if spec.encoded {
		return Cow::Borrowed(value);
	}
	match spec.source {
		Source::Path | Source::Matrix => encode::decode(value),
		Source::Query => encode::decode_form(value),
		Source::Header | Source::Cookie => Cow::Borrowed(value),
	}
}

fn convert(spec: &ParamSpec, kind: &Kind, raw: &str) -> ParamResult<ParamValue> {
	let parse_error = |message: String| ParamError::Parse {
		name: spec.name.clone(),
		target: kind.name(),
		raw: raw.to_string(),
		message,
	};

	match kind {
		Kind::Text => Ok(ParamValue::Text(raw.to_string())),
		Kind::Int => raw
			.trim()
			.parse::<i64>()
			.map(ParamValue::Int)
			.map_err(|e| parse_error(e.to_string())),
		Kind::Float => raw
			.trim()
			.parse::<f64>()
			.map(ParamValue::Float)
			.map_err(|e| parse_error(e.to_string())),
		Kind::Bool => match raw.trim().to_ascii_lowercase().as_str() {
			"true" => Ok(ParamValue::Bool(true)),
			"false" => Ok(ParamValue::Bool(false)),
			_ => Err(parse_error("expected 'true' or 'false'".to_string())),
		},
		Kind::List(inner) => Ok(ParamValue::List(vec![convert(spec, inner, raw)?])),
	}
}
