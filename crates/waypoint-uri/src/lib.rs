//! # Waypoint URI
//!
//! URI templates for request routing and URI construction.
//!
//! ## Features
//!
//! - **Templates**: `{name}` and `{name:regex}` parameters compiled into
//!   anchored regular expressions
//! - **Matching**: whole-path and prefix matching with repeated-name checks
//! - **Building**: a fluent [`UriBuilder`] that substitutes values and
//!   percent-encodes them by component
//! - **Routing**: a [`RouteTable`] ordered by template specificity
//!
//! ## Quick Start
//!
//! ```
//! use waypoint_uri::{CompiledTemplate, UriBuilder};
//!
//! let template = CompiledTemplate::compile("widgets/{id}").unwrap();
//!
//! let params = template.matches("widgets/12").unwrap();
//! assert_eq!(params.get("id"), Some("12"));
//!
//! let uri = UriBuilder::from_template(&template)
//!     .build_from_values(&["a b"])
//!     .unwrap();
//! assert_eq!(uri.to_string(), "widgets/a%20b");
//! ```

pub mod builder;
pub mod config;
pub mod encode;
pub mod error;
pub mod matcher;
pub mod registry;
pub mod router;
pub mod template;
pub mod uri;

pub use builder::UriBuilder;
pub use config::UriConfig;
pub use encode::Component;
pub use error::{UriError, UriResult};
pub use matcher::{MatchResult, match_path, match_prefix};
pub use registry::BuilderRegistry;
pub use router::{Route, RouteMatch, RouteTable};
pub use template::{CompiledTemplate, DEFAULT_PATTERN, Parameter, Segment, Template};
pub use uri::Uri;
