//! # Waypoint HTTP
//!
//! HTTP-facing records and contracts used next to URI templates:
//! cookies, entity tags, content variant selection and the shape of
//! conditional request evaluation.
//!
//! ## Quick Start
//!
//! ```
//! use waypoint_http::{AcceptVariantSelector, VariantListBuilder, VariantSelector};
//!
//! let variants = VariantListBuilder::new()
//!     .media_types(["text/html", "application/json"])
//!     .languages(["en", "de"])
//!     .build();
//!
//! let selector = AcceptVariantSelector::new(Some("application/json"), Some("de, en;q=0.8"), None);
//! let selection = selector.select_variant(&variants).unwrap();
//!
//! assert_eq!(selection.variant.media_type.as_deref(), Some("application/json"));
//! assert_eq!(selection.variant.language.as_deref(), Some("de"));
//! assert_eq!(selection.vary.len(), 2);
//! ```

pub mod cookie;
pub mod entity_tag;
pub mod error;
pub mod precondition;
pub mod variant;

pub use cookie::{Cookie, NewCookie};
pub use entity_tag::EntityTag;
pub use error::{HttpError, HttpResult};
pub use precondition::{Precondition, Preconditions, ResponseDescriptor, parse_http_date};
pub use variant::{AcceptVariantSelector, Selection, Variant, VariantListBuilder, VariantSelector};
