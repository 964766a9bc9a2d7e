//! # Waypoint Params
//!
//! Explicit parameter binding for matched routes. A route declares the
//! parameters it needs as [`ParamSpec`]s; a [`Binder`] resolves them
//! against the path parameters, query string, matrix parameters, headers
//! and cookies of a request, decoding and converting each value.
//!
//! ## Quick Start
//!
//! ```
//! use waypoint_params::{Binder, Kind, ParamSpec, ParamValue, RequestData};
//! use waypoint_uri::RouteTable;
//!
//! let mut routes = RouteTable::new();
//! routes.route("orders/{id:\\d+}", "order").unwrap();
//!
//! let found = routes.match_path("/orders/15").unwrap();
//! let request = RequestData::from_uri("/orders/15?expand=true", &found.params);
//!
//! let params = Binder::new(vec![
//!     ParamSpec::path("id").kind(Kind::Int),
//!     ParamSpec::query("expand").kind(Kind::Bool).default_value("false"),
//! ])
//! .bind(&request)
//! .unwrap();
//!
//! assert_eq!(params.get("id"), Some(&ParamValue::Int(15)));
//! assert_eq!(params.get("expand"), Some(&ParamValue::Bool(true)));
//! ```

pub mod binder;
pub mod error;
pub mod param;
pub mod request;

pub use binder::{Binder, BoundParams, ParamValue};
pub use error::{ParamError, ParamResult};
pub use param::{Kind, ParamSpec, Source};
pub use request::RequestData;
