//! Error types for content negotiation and header values.

/// Errors raised by variant selection and header parsing.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HttpError {
	/// Variant selection was asked to choose from an empty list.
	#[error("Variant list must not be empty")]
	EmptyVariantList,
	/// None of the offered variants is acceptable to the client.
	#[error("None of the available variants is acceptable")]
	NotAcceptable,
	/// An entity tag is not a quoted string, optionally prefixed by `W/`.
	#[error("Invalid entity tag: '{0}'")]
	InvalidEntityTag(String),
	/// A header value could not be produced or parsed.
	#[error("Invalid header value: {0}")]
	InvalidHeader(String),
}

/// Result alias used throughout this crate.
pub type HttpResult<T> = Result<T, HttpError>;
