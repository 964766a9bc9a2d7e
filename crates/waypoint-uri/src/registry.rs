//! Explicitly owned factory for builders and compiled templates.
//!
//! Applications create one [`BuilderRegistry`] at startup and hand it to
//! whatever needs to build URIs. Compiled templates are cached by their
//! source string and shared between callers. After [`shutdown`] every
//! operation fails with [`UriError::RegistryClosed`].
//!
//! [`shutdown`]: BuilderRegistry::shutdown

use crate::builder::UriBuilder;
use crate::config::UriConfig;
use crate::error::{UriError, UriResult};
use crate::template::CompiledTemplate;
use parking_lot::RwLock;
use std::collections::HashMap;

#[derive(Debug, Default)]
struct RegistryState {
	templates: HashMap<String, CompiledTemplate>,
	resources: HashMap<String, CompiledTemplate>,
}

/// Creates builders and caches compiled templates.
///
/// # Examples
///
/// ```
/// use waypoint_uri::{BuilderRegistry, UriConfig, UriError};
///
/// let registry = BuilderRegistry::init(UriConfig::default());
/// registry.register_resource("user", "users/{id}").unwrap();
///
/// let uri = registry
///     .from_resource("user")
///     .unwrap()
///     .build_from_values(&["7"])
///     .unwrap();
/// assert_eq!(uri.to_string(), "users/7");
///
/// registry.shutdown();
/// assert_eq!(registry.new_builder().unwrap_err(), UriError::RegistryClosed);
/// ```
#[derive(Debug)]
pub struct BuilderRegistry {
	config: UriConfig,
	state: RwLock<Option<RegistryState>>,
}

impl Default for BuilderRegistry {
	fn default() -> Self {
		Self::init(UriConfig::default())
	}
}

impl BuilderRegistry {
	/// Creates an active registry.
	pub fn init(config: UriConfig) -> Self {
		tracing::debug!(?config, "initialized URI builder registry");
		Self {
			config,
			state: RwLock::new(Some(RegistryState::default())),
		}
	}

	pub fn config(&self) -> &UriConfig {
		&self.config
	}

	/// Whether [`shutdown`](Self::shutdown) has not been called yet.
	pub fn is_active(&self) -> bool {
		self.state.read().is_some()
	}

	fn ensure_active(&self) -> UriResult<()> {
		if self.is_active() {
			Ok(())
		} else {
			Err(UriError::RegistryClosed)
		}
	}

	/// Creates an empty builder configured by this registry.
	pub fn new_builder(&self) -> UriResult<UriBuilder> {
		self.ensure_active()?;
		Ok(UriBuilder::with_config(&self.config))
	}

	pub fn from_path(&self, path: &str) -> UriResult<UriBuilder> {
		self.new_builder()?.replace_path(path)
	}

	pub fn from_uri(&self, uri: &str) -> UriResult<UriBuilder> {
		self.new_builder()?.uri_str(uri)
	}

	/// Compiles `template`, reusing a cached compilation when caching is
	/// enabled.
	pub fn compile(&self, template: &str) -> UriResult<CompiledTemplate> {
		if self.config.cache_templates {
			let state = self.state.read();
			let state = state.as_ref().ok_or(UriError::RegistryClosed)?;
			if let Some(compiled) = state.templates.get(template) {
				tracing::trace!(template = %template, "template cache hit");
				return Ok(compiled.clone());
			}
		} else {
			self.ensure_active()?;
		}

		let compiled = CompiledTemplate::compile_with(template, &self.config)?;

		if self.config.cache_templates {
			let mut state = self.state.write();
			let state = state.as_mut().ok_or(UriError::RegistryClosed)?;
			let entry = state
				.templates
				.entry(template.to_string())
				.or_insert(compiled);
			return Ok(entry.clone());
		}
		Ok(compiled)
	}

	/// Registers a named resource template, replacing any previous template
	/// with the same name.
	pub fn register_resource(&self, name: &str, template: &str) -> UriResult<CompiledTemplate> {
		let compiled = self.compile(template)?;
		let mut state = self.state.write();
		let state = state.as_mut().ok_or(UriError::RegistryClosed)?;
		state.resources.insert(name.to_string(), compiled.clone());
		tracing::debug!(resource = %name, template = %template, "registered resource template");
		Ok(compiled)
	}

	/// The template registered as `name`.
	pub fn resource(&self, name: &str) -> UriResult<CompiledTemplate> {
		let state = self.state.read();
		let state = state.as_ref().ok_or(UriError::RegistryClosed)?;
		state
			.resources
			.get(name)
			.cloned()
			.ok_or_else(|| UriError::UnknownResource(name.to_string()))
	}

	/// Creates a builder whose path is the resource registered as `name`.
	pub fn from_resource(&self, name: &str) -> UriResult<UriBuilder> {
		let template = self.resource(name)?;
		Ok(self.new_builder()?.path_template(&template))
	}

	/// Number of cached compiled templates.
	pub fn cached_templates(&self) -> usize {
		self.state
			.read()
			.as_ref()
			.map_or(0, |state| state.templates.len())
	}

	/// Drops all cached state. Later calls fail with
	/// [`UriError::RegistryClosed`]. Calling it again has no effect.
	pub fn shutdown(&self) {
		if self.state.write().take().is_some() {
			tracing::debug!("URI builder registry shut down");
		}
	}
}
