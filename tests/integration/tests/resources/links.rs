//! Link Building Integration Tests
//!
//! URIs for registered resources are built from the same templates the
//! route table matches, so every link dispatches back to its resource.

use rstest::*;
use waypoint_integration_tests::{DispatchError, Outcome, Resources, TestRequest};
use waypoint_params::ParamValue;
use waypoint::UriError;

#[fixture]
fn resources() -> Resources {
	Resources::new().unwrap()
}

#[rstest]
#[case("product", &[("sku", "tea pot")], "products/tea%20pot")]
#[case("product", &[("sku", "a/b;c")], "products/a%2Fb%3Bc")]
#[case("search", &[], "search")]
#[case("file", &[("path", "docs/notes.md")], "files/docs%2Fnotes.md")]
fn test_link(resources: Resources, #[case] name: &str, #[case] values: &[(&str, &str)], #[case] expected: &str) {
	let uri = resources.link(name, values).unwrap();
	assert_eq!(uri.to_string(), expected);
}

#[rstest]
#[case("sku", "tea pot")]
#[case("sku", "50% off")]
#[case("sku", "caf\u{e9}")]
fn test_link_dispatches_back(resources: Resources, #[case] name: &str, #[case] value: &str) {
	// Arrange
	let uri = resources.link("product", &[(name, value)]).unwrap();

	// Act
	let outcome = resources
		.dispatch(&TestRequest::get(&format!("/{}", uri.path_and_query())))
		.unwrap();

	// Assert
	let Outcome::Handled { resource, params, .. } = outcome else {
		panic!("link should reach the handler");
	};
	assert_eq!(resource, "product");
	assert_eq!(params.get(name).and_then(ParamValue::as_str), Some(value));
}

#[rstest]
fn test_missing_link_value(resources: Resources) {
	let result = resources.link("product", &[]);
	assert!(matches!(
		result,
		Err(DispatchError::Uri(UriError::IncompleteTemplate { ref parameter })) if parameter == "sku"
	));
}

#[rstest]
fn test_unknown_resource(resources: Resources) {
	let result = resources.link("order", &[]);
	assert!(matches!(
		result,
		Err(DispatchError::Uri(UriError::UnknownResource(ref name))) if name == "order"
	));
}

#[rstest]
fn test_links_fail_after_shutdown(resources: Resources) {
	resources.registry().shutdown();

	let result = resources.link("search", &[]);

	assert!(matches!(result, Err(DispatchError::Uri(UriError::RegistryClosed))));
}
