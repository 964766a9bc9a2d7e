//! # Waypoint
//!
//! URI templates for REST resource frameworks: compile `{name}` and
//! `{name:regex}` templates, match request paths against them, and build
//! URIs back from them with per-component percent-encoding.
//!
//! ## Feature Flags
//!
//! - `minimal` - Template compiling, matching and URI building only
//! - `full` (default) - Everything below
//!
//! ### Fine-grained Control
//!
//! - `uri` - Templates, matching, [`UriBuilder`], route tables and the
//!   builder registry
//! - `http` - Cookie records, entity tags, variant selection and
//!   precondition contracts
//! - `params` - Explicit parameter declarations bound against a match
//!
//! ## Quick Example
//!
//! ```
//! use waypoint::prelude::*;
//!
//! let mut routes = RouteTable::new();
//! routes.named_route("user", "users/{id:\\d+}", "user-detail").unwrap();
//!
//! let found = routes.match_path("/users/42").unwrap();
//! assert_eq!(*found.value(), "user-detail");
//! assert_eq!(found.param("id"), Some("42"));
//!
//! let uri = routes.reverse("user", &[("id", "7")]).unwrap();
//! assert_eq!(uri.to_string(), "users/7");
//!
//! let uri = UriBuilder::from_uri("https://example.com")
//!     .unwrap()
//!     .path(&["search"])
//!     .unwrap()
//!     .query_param("q", "{q}")
//!     .unwrap()
//!     .build_from_values(&["rust & uri"])
//!     .unwrap();
//! assert_eq!(uri.to_string(), "https://example.com/search?q=rust+%26+uri");
//! ```

pub use waypoint_uri as uri;

#[cfg(feature = "http")]
pub use waypoint_http as http;

#[cfg(feature = "params")]
pub use waypoint_params as params;

pub use waypoint_uri::{
	BuilderRegistry, CompiledTemplate, MatchResult, RouteTable, Uri, UriBuilder, UriConfig, UriError,
	UriResult,
};

/// Commonly used types.
pub mod prelude {
	pub use waypoint_uri::{
		BuilderRegistry, CompiledTemplate, MatchResult, Route, RouteMatch, RouteTable, Template, Uri,
		UriBuilder, UriConfig, UriError, UriResult, match_path, match_prefix,
	};

	#[cfg(feature = "http")]
	pub use waypoint_http::{
		AcceptVariantSelector, Cookie, EntityTag, HttpError, NewCookie, Precondition, Preconditions,
		ResponseDescriptor, Selection, Variant, VariantListBuilder, VariantSelector,
	};

	#[cfg(feature = "params")]
	pub use waypoint_params::{Binder, BoundParams, Kind, ParamError, ParamSpec, ParamValue, RequestData, Source};
}
