//! Routing and Parameter Binding Integration Tests
//!
//! A request path selects a resource through the route table and the
//! resource's declared parameters are bound from the same request.

use rstest::*;
use waypoint_http::Variant;
use waypoint_integration_tests::{DispatchError, Outcome, Resources, TestRequest};
use waypoint_params::{ParamError, ParamValue};

#[fixture]
fn resources() -> Resources {
	Resources::new().unwrap()
}

fn handled(outcome: Outcome) -> (&'static str, waypoint_params::BoundParams, Option<waypoint_http::Selection>) {
	match outcome {
		Outcome::Handled {
			resource,
			params,
			selection,
		} => (resource, params, selection),
		Outcome::Respond(response) => panic!("unexpected response: {:?}", response.status),
	}
}

#[rstest]
fn test_product_parameters(resources: Resources) {
	// Act
	let outcome = resources
		.dispatch(&TestRequest::get("/products/tea%20pot;color=dark%20green?ref=home"))
		.unwrap();

	// Assert
	let (resource, params, selection) = handled(outcome);
	assert_eq!(resource, "product");
	assert_eq!(
		params.get("sku").and_then(ParamValue::as_str),
		Some("tea pot;color=dark green")
	);
	assert_eq!(params.get("color").and_then(ParamValue::as_str), Some("dark green"));
	assert_eq!(params.get("qty"), Some(&ParamValue::Int(1)));
	assert_eq!(
		selection.unwrap().variant,
		Variant::default()
			.with_media_type("application/json")
			.with_language("en")
	);
}

#[rstest]
fn test_search_parameters(resources: Resources) {
	let outcome = resources
		.dispatch(&TestRequest::get("/search?q=blue+mugs&tag=kitchen&tag=gift&page=3"))
		.unwrap();

	let (resource, params, _) = handled(outcome);
	assert_eq!(resource, "search");
	assert_eq!(params.get("q").and_then(ParamValue::as_str), Some("blue mugs"));
	assert_eq!(params.get("tag").and_then(ParamValue::as_list).map(<[_]>::len), Some(2));
	assert_eq!(params.get("page").and_then(ParamValue::as_int), Some(3));
}

#[rstest]
fn test_encoded_path_parameter_is_kept(resources: Resources) {
	let outcome = resources
		.dispatch(&TestRequest::get("/files/docs/release%20notes.md"))
		.unwrap();

	let (resource, params, selection) = handled(outcome);
	assert_eq!(resource, "file");
	assert_eq!(
		params.get("path").and_then(ParamValue::as_str),
		Some("docs/release%20notes.md")
	);
	assert!(selection.is_none());
}

#[rstest]
#[case("/")]
#[case("/products")]
#[case("/products/a/b")]
#[case("/searching")]
fn test_unknown_paths(resources: Resources, #[case] uri: &str) {
	let result = resources.dispatch(&TestRequest::get(uri));
	assert!(matches!(result, Err(DispatchError::NotFound(_))), "{uri}");
}

#[rstest]
fn test_conversion_failure(resources: Resources) {
	let result = resources.dispatch(&TestRequest::get("/products/x?qty=many"));

	assert!(matches!(
		result,
		Err(DispatchError::Params(ParamError::Parse { ref name, .. })) if name == "qty"
	));
}
