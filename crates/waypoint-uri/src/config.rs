//! Configuration for template compilation and builder defaults.
//!
//! Settings can be constructed in code or loaded from a TOML document:
//!
//! ```
//! use waypoint_uri::UriConfig;
//!
//! let config = UriConfig::from_toml_str(
//!     r#"
//!     auto_encode = false
//!     max_template_length = 256
//!     "#,
//! )
//! .unwrap();
//! assert!(!config.auto_encode);
//! assert_eq!(config.max_template_length, 256);
//! assert!(config.cache_templates);
//! ```

use serde::{Deserialize, Serialize};

/// Default maximum length of a template string in bytes.
pub const DEFAULT_MAX_TEMPLATE_LENGTH: usize = 1024;

/// Default size limit for a compiled template regex (in bytes).
pub const DEFAULT_REGEX_SIZE_LIMIT: usize = 1 << 20; // 1 MiB

/// Settings shared by the compiler, the builder and the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UriConfig {
	/// Whether builders created from this configuration encode illegal
	/// characters automatically.
	pub auto_encode: bool,
	/// Templates longer than this are rejected at compile time.
	pub max_template_length: usize,
	/// Upper bound handed to `regex::RegexBuilder::size_limit`.
	pub regex_size_limit: usize,
	/// Whether the registry caches compiled templates by source string.
	pub cache_templates: bool,
}

impl Default for UriConfig {
	fn default() -> Self {
		Self {
			auto_encode: true,
			max_template_length: DEFAULT_MAX_TEMPLATE_LENGTH,
			regex_size_limit: DEFAULT_REGEX_SIZE_LIMIT,
			cache_templates: true,
		}
	}
}

impl UriConfig {
	/// Creates the default configuration.
	pub fn new() -> Self {
		Self::default()
	}

	/// Parses a configuration from TOML. Missing keys keep their defaults.
	pub fn from_toml_str(source: &str) -> Result<Self, toml::de::Error> {
		toml::from_str(source)
	}

	pub fn with_auto_encode(mut self, enabled: bool) -> Self {
		self.auto_encode = enabled;
		self
	}

	pub fn with_max_template_length(mut self, length: usize) -> Self {
		self.max_template_length = length;
		self
	}

	pub fn with_regex_size_limit(mut self, limit: usize) -> Self {
		self.regex_size_limit = limit;
		self
	}

	pub fn with_template_cache(mut self, enabled: bool) -> Self {
		self.cache_templates = enabled;
		self
	}
}
