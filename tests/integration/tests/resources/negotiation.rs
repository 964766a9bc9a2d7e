//! Content Negotiation Integration Tests
//!
//! Representations of a resource are chosen from the request's Accept
//! headers.

use http::header::{ACCEPT, ACCEPT_LANGUAGE};
use rstest::*;
use waypoint_http::HttpError;
use waypoint_integration_tests::{DispatchError, Outcome, Resources, TestRequest};

#[fixture]
fn resources() -> Resources {
	Resources::new().unwrap()
}

#[rstest]
#[case("text/html", "de", "text/html", "de")]
#[case("text/html;q=0.4, application/json;q=0.6", "de;q=0.1, en", "application/json", "en")]
#[case("*/*", "de-AT, de;q=0.9", "application/json", "de")]
#[case("text/*", "*", "text/html", "en")]
fn test_selects_representation(
	resources: Resources,
	#[case] accept: &str,
	#[case] accept_language: &str,
	#[case] media_type: &str,
	#[case] language: &str,
) {
	// Arrange
	let request = TestRequest::get("/products/kettle")
		.header(ACCEPT, accept)
		.header(ACCEPT_LANGUAGE, accept_language);

	// Act
	let outcome = resources.dispatch(&request).unwrap();

	// Assert
	let Outcome::Handled { selection, .. } = outcome else {
		panic!("request should reach the handler");
	};
	let selection = selection.unwrap();
	assert_eq!(selection.variant.media_type.as_deref(), Some(media_type));
	assert_eq!(selection.variant.language.as_deref(), Some(language));
	assert_eq!(selection.vary, vec![ACCEPT, ACCEPT_LANGUAGE]);
}

#[rstest]
fn test_not_acceptable(resources: Resources) {
	let request = TestRequest::get("/search").header(ACCEPT, "text/html, application/json;q=0");

	let result = resources.dispatch(&request);

	assert!(matches!(result, Err(DispatchError::Http(HttpError::NotAcceptable))));
}
