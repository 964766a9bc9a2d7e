//! Parameter binding errors.

use crate::param::Source;
use waypoint_uri::UriError;

/// Errors raised while binding request parameters.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParamError {
	/// A required parameter has no value and no default.
	#[error("Missing {location} parameter '{name}'")]
	Missing {
		/// Declared parameter name.
		name: String,
		/// Where the value was looked up.
		location: Source,
	},
	/// A value could not be converted to the declared kind.
	#[error("Failed to parse parameter '{name}' value '{raw}' as {target}: {message}")]
	Parse {
		/// Declared parameter name.
		name: String,
		/// Name of the target kind.
		target: &'static str,
		/// The value as found in the request, after decoding.
		raw: String,
		/// Error message from parsing.
		message: String,
	},
	#[error(transparent)]
	Uri(#[from] UriError),
}

/// Result alias used throughout this crate.
pub type ParamResult<T> = Result<T, ParamError>;
