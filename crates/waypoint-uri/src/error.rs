//! Error types for template compiling, matching and URI building.

use crate::encode::Component;

/// Errors raised while compiling templates or assembling URIs.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UriError {
	/// The template string is malformed: unbalanced braces, an invalid
	/// parameter name or a regular expression that does not compile.
	#[error("Invalid URI template '{template}': {reason}")]
	TemplateSyntax {
		/// The offending template.
		template: String,
		/// What is wrong with it.
		reason: String,
	},
	/// A literal value contains characters that are illegal in the target
	/// URI component while automatic encoding is disabled.
	#[error("Illegal characters in {component} component: '{value}'")]
	InvalidComponent {
		/// The component the value was destined for.
		component: Component,
		/// The rejected value.
		value: String,
	},
	/// A value-supplying build was missing a value for a template parameter.
	#[error("No value supplied for template parameter '{parameter}'")]
	IncompleteTemplate {
		/// Name of the unresolved parameter.
		parameter: String,
	},
	/// The substituted string is not a structurally valid URI.
	#[error("Malformed URI '{uri}': {reason}")]
	MalformedUri {
		/// The string that failed to parse.
		uri: String,
		/// Why it was rejected.
		reason: String,
	},
	/// The builder registry has been shut down.
	#[error("URI builder registry has been shut down")]
	RegistryClosed,
	/// No resource template is registered under the given name.
	#[error("No resource template registered as '{0}'")]
	UnknownResource(String),
}

impl UriError {
	pub(crate) fn syntax(template: &str, reason: impl Into<String>) -> Self {
		Self::TemplateSyntax {
			template: template.to_string(),
			reason: reason.into(),
		}
	}

	pub(crate) fn invalid(component: Component, value: &str) -> Self {
		Self::InvalidComponent {
			component,
			value: value.to_string(),
		}
	}

	pub(crate) fn malformed(uri: &str, reason: impl Into<String>) -> Self {
		Self::MalformedUri {
			uri: uri.to_string(),
			reason: reason.into(),
		}
	}
}

/// Result alias used throughout this crate.
pub type UriResult<T> = Result<T, UriError>;
