//! Representation variants and their selection.
//!
//! A resource offers a list of [`Variant`]s. A [`VariantSelector`] picks
//! the one that best fits the request and reports which request headers
//! took part in the decision, so the caller can emit a `Vary` header.

use crate::error::{HttpError, HttpResult};
use http::HeaderMap;
use http::header::{ACCEPT, ACCEPT_ENCODING, ACCEPT_LANGUAGE, HeaderName};
use serde::{Deserialize, Serialize};

/// One representation of a resource. Unset dimensions match any request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Variant {
	pub media_type: Option<String>,
	pub language: Option<String>,
	pub encoding: Option<String>,
}

impl Variant {
	pub fn new(media_type: Option<&str>, language: Option<&str>, encoding: Option<&str>) -> Self {
		Self {
			media_type: media_type.map(str::to_string),
			language: language.map(str::to_string),
			encoding: encoding.map(str::to_string),
		}
	}

	pub fn with_media_type(mut self, media_type: impl Into<String>) -> Self {
		self.media_type = Some(media_type.into());
		self
	}

	pub fn with_language(mut self, language: impl Into<String>) -> Self {
		self.language = Some(language.into());
		self
	}

	pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
		self.encoding = Some(encoding.into());
		self
	}

	/// Number of dimensions this variant specifies.
	pub fn explicitness(&self) -> usize {
		[&self.media_type, &self.language, &self.encoding]
			.iter()
			.filter(|dimension| dimension.is_some())
			.count()
	}
}

/// Builds variant lists as the cartesian product of the collected
/// media types, languages and encodings.
///
/// # Examples
///
/// ```
/// use waypoint_http::VariantListBuilder;
///
/// let variants = VariantListBuilder::new()
///     .media_types(["application/json", "text/html"])
///     .languages(["en", "fr"])
///     .add()
///     .media_types(["text/plain"])
///     .build();
///
/// assert_eq!(variants.len(), 5);
/// assert_eq!(variants[0].media_type.as_deref(), Some("application/json"));
/// assert_eq!(variants[0].language.as_deref(), Some("en"));
/// assert_eq!(variants[4].language, None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct VariantListBuilder {
	variants: Vec<Variant>,
	media_types: Vec<String>,
	languages: Vec<String>,
	encodings: Vec<String>,
}

impl VariantListBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn media_types<I, S>(mut self, media_types: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.media_types.extend(media_types.into_iter().map(Into::into));
		self
	}

	pub fn languages<I, S>(mut self, languages: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.languages.extend(languages.into_iter().map(Into::into));
		self
	}

	pub fn encodings<I, S>(mut self, encodings: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.encodings.extend(encodings.into_iter().map(Into::into));
		self
	}

	/// Appends the product of the collected values to the list and clears
	/// them. Does nothing when no value was collected.
	pub fn add(mut self) -> Self {
		if self.media_types.is_empty() && self.languages.is_empty() && self.encodings.is_empty() {
			return self;
		}

		let media_types = dimension(std::mem::take(&mut self.media_types));
		let languages = dimension(std::mem::take(&mut self.languages));
		let encodings = dimension(std::mem::take(&mut self.encodings));

		for media_type in &media_types {
			for language in &languages {
				for encoding in &encodings {
					self.variants.push(Variant {
						media_type: media_type.clone(),
						language: language.clone(),
						encoding: encoding.clone(),
					});
				}
			}
		}
		self
	}

	/// Adds any pending values and returns the list.
	pub fn build(self) -> Vec<Variant> {
		self.add().variants
	}
}

fn dimension(values: Vec<String>) -> Vec<Option<String>> {
	if values.is_empty() {
		vec![None]
	} else {
		values.into_iter().map(Some).collect()
	}
}

/// The chosen variant and the request headers that influenced the choice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
	pub variant: Variant,
	pub vary: Vec<HeaderName>,
}

/// Chooses a variant for one request.
pub trait VariantSelector {
	/// Returns the best acceptable variant.
	///
	/// Fails with [`HttpError::EmptyVariantList`] for an empty list and with
	/// [`HttpError::NotAcceptable`] when no variant fits the request.
	fn select_variant(&self, variants: &[Variant]) -> HttpResult<Selection>;
}

/// Request headers relevant to a variant list: one per dimension that at
/// least one variant specifies.
pub fn vary(variants: &[Variant]) -> Vec<HeaderName> {
	let mut headers = Vec::new();
	if variants.iter().any(|v| v.media_type.is_some()) {
		headers.push(ACCEPT);
	}
	if variants.iter().any(|v| v.language.is_some()) {
		headers.push(ACCEPT_LANGUAGE);
	}
	if variants.iter().any(|v| v.encoding.is_some()) {
		headers.push(ACCEPT_ENCODING);
	}
	headers
}

/// An entry of an `Accept*` header: a range and its quality.
#[derive(Debug, Clone, PartialEq)]
struct QualityItem {
	range: String,
	quality: f32,
}

impl QualityItem {
	fn parse(s: &str) -> Option<Self> {
		let mut parts = s.split(';');
		let range = parts.next()?.trim().to_lowercase();
		if range.is_empty() {
			return None;
		}

		let mut quality = 1.0;
		for param in parts {
			if let Some((key, value)) = param.trim().split_once('=')
				&& key.trim().eq_ignore_ascii_case("q")
				&& let Ok(q) = value.trim().parse::<f32>()
				&& q.is_finite()
			{
				quality = q.clamp(0.0, 1.0);
			}
		}

		Some(Self { range, quality })
	}

	fn parse_list(header: &str) -> Vec<Self> {
		header.split(',').filter_map(Self::parse).collect()
	}
}

/// How well one dimension of a variant fits the request.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Fit {
	quality: f32,
	specificity: u32,
}

impl Fit {
	const ANY: Self = Self {
		quality: 1.0,
		specificity: 0,
	};

	const NONE: Self = Self {
		quality: 0.0,
		specificity: 0,
	};
}

/// Picks the most specific matching range; earlier entries win ties.
fn best_fit(items: &[QualityItem], specificity: impl Fn(&str) -> Option<u32>) -> Fit {
	let mut best: Option<Fit> = None;
	for item in items {
		if let Some(level) = specificity(&item.range)
			&& best.is_none_or(|fit| level > fit.specificity)
		{
			best = Some(Fit {
				quality: item.quality,
				specificity: level,
			});
		}
	}
	best.unwrap_or(Fit::NONE)
}

fn media_specificity(range: &str, media_type: &str) -> Option<u32> {
	let essence = media_type.split(';').next().unwrap_or_default().trim().to_lowercase();
	let (kind, subtype) = essence.split_once('/')?;

	if range == "*" || range == "*/*" {
		return Some(0);
	}
	let (range_kind, range_subtype) = range.split_once('/')?;
	if range_kind != kind {
		return None;
	}
	if range_subtype == "*" {
		Some(1)
	} else if range_subtype == subtype {
		Some(2)
	} else {
		None
	}
}

fn language_specificity(range: &str, language: &str) -> Option<u32> {
	if range == "*" {
		return Some(0);
	}
	let language = language.to_lowercase();
	let tags = range.split('-').count() as u32;
	let matched = language == range
		|| language
			.strip_prefix(range)
			.is_some_and(|rest| rest.starts_with('-'));
	matched.then_some(tags)
}

fn encoding_specificity(range: &str, encoding: &str) -> Option<u32> {
	if range == "*" {
		Some(0)
	} else if range.eq_ignore_ascii_case(encoding) {
		Some(1)
	} else {
		None
	}
}

/// Selects variants from the `Accept`, `Accept-Language` and
/// `Accept-Encoding` request headers.
///
/// A variant's score is the product of its per-dimension qualities. A
/// dimension the request does not constrain, or the variant leaves unset,
/// contributes 1. A quality of 0 makes the variant unacceptable. Among
/// equal scores, variants specifying more dimensions win, then those
/// matched by more specific ranges, then the earlier one in the list.
///
/// # Examples
///
/// ```
/// use waypoint_http::{AcceptVariantSelector, Variant, VariantSelector};
///
/// let selector = AcceptVariantSelector::new(Some("text/html;q=0.8, application/json"), None, None);
/// let variants = [
///     Variant::default().with_media_type("text/html"),
///     Variant::default().with_media_type("application/json"),
/// ];
///
/// let selection = selector.select_variant(&variants).unwrap();
/// assert_eq!(selection.variant.media_type.as_deref(), Some("application/json"));
/// assert_eq!(selection.vary, vec![http::header::ACCEPT]);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AcceptVariantSelector {
	accept: Option<Vec<QualityItem>>,
	accept_language: Option<Vec<QualityItem>>,
	accept_encoding: Option<Vec<QualityItem>>,
}

impl AcceptVariantSelector {
	/// Creates a selector from raw header values. `None` means the header
	/// was not sent.
	pub fn new(accept: Option<&str>, accept_language: Option<&str>, accept_encoding: Option<&str>) -> Self {
		Self {
			accept: accept.map(QualityItem::parse_list),
			accept_language: accept_language.map(QualityItem::parse_list),
			accept_encoding: accept_encoding.map(QualityItem::parse_list),
		}
	}

	/// Creates a selector from request headers. Repeated header lines are
	/// combined.
	pub fn from_headers(headers: &HeaderMap) -> HttpResult<Self> {
		let accept = combined(headers, &ACCEPT)?;
		let accept_language = combined(headers, &ACCEPT_LANGUAGE)?;
		let accept_encoding = combined(headers, &ACCEPT_ENCODING)?;
		Ok(Self::new(
			accept.as_deref(),
			accept_language.as_deref(),
			accept_encoding.as_deref(),
		))
	}

	fn fit(&self, variant: &Variant) -> (f32, u32) {
		let dimensions = [
			dimension_fit(&self.accept, &variant.media_type, media_specificity),
			dimension_fit(&self.accept_language, &variant.language, language_specificity),
			dimension_fit(&self.accept_encoding, &variant.encoding, encoding_specificity),
		];
		let quality = dimensions.iter().map(|fit| fit.quality).product();
		let specificity = dimensions.iter().map(|fit| fit.specificity).sum();
		(quality, specificity)
	}
}

fn dimension_fit(
	items: &Option<Vec<QualityItem>>,
	value: &Option<String>,
	specificity: fn(&str, &str) -> Option<u32>,
) -> Fit {
	match (items, value) {
		(Some(items), Some(value)) => best_fit(items, |range| specificity(range, value)),
		_ => Fit::ANY,
	}
}

fn combined(headers: &HeaderMap, name: &HeaderName) -> HttpResult<Option<String>> {
	let mut values = Vec::new();
	for value in headers.get_all(name) {
		let value = value
			.to_str()
			.map_err(|_| HttpError::InvalidHeader(name.to_string()))?;
		values.push(value);
	}
	if values.is_empty() {
		Ok(None)
	} else {
		Ok(Some(values.join(", ")))
	}
}

impl VariantSelector for AcceptVariantSelector {
	fn select_variant(&self, variants: &[Variant]) -> HttpResult<Selection> {
		if variants.is_empty() {
			return Err(HttpError::EmptyVariantList);
		}

		let mut best: Option<(usize, f32, usize, u32)> = None;
		for (index, variant) in variants.iter().enumerate() {
			let (quality, specificity) = self.fit(variant);
			tracing::trace!(index, quality, specificity, "scored variant");
			if quality <= 0.0 {
				continue;
			}
			let explicitness = variant.explicitness();
			let better = match best {
				None => true,
				Some((_, best_quality, best_explicitness, best_specificity)) => {
					(quality, explicitness, specificity) > (best_quality, best_explicitness, best_specificity)
				}
			};
			if better {
				best = Some((index, quality, explicitness, specificity));
			}
		}

		let Some((index, quality, ..)) = best else {
			tracing::debug!(variants = variants.len(), "no acceptable variant");
			return Err(HttpError::NotAcceptable);
		};

		let variant = variants[index].clone();
		tracing::debug!(index, quality, variant = ?variant, "selected variant");
		Ok(Selection {
			variant,
			vary: vary(variants),
		})
	}
}
