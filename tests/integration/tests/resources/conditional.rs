//! Conditional Request Integration Tests
//!
//! Entity tag and modification date validators short-circuit requests
//! before the handler runs.

use chrono::{DateTime, Duration, Utc};
use http::header::{ETAG, IF_MATCH, IF_MODIFIED_SINCE, IF_NONE_MATCH, IF_UNMODIFIED_SINCE, LAST_MODIFIED, VARY};
use http::{Method, StatusCode};
use rstest::*;
use std::time::SystemTime;
use waypoint_integration_tests::{Outcome, PRODUCT_LAST_MODIFIED, Resources, TestRequest};

#[fixture]
fn resources() -> Resources {
	Resources::new().unwrap()
}

fn http_date(offset_seconds: i64) -> String {
	let date = DateTime::<Utc>::from_timestamp(PRODUCT_LAST_MODIFIED, 0).unwrap() + Duration::seconds(offset_seconds);
	httpdate::fmt_http_date(SystemTime::from(date))
}

fn status(outcome: &Outcome) -> Option<StatusCode> {
	match outcome {
		Outcome::Handled { .. } => None,
		Outcome::Respond(response) => Some(response.status),
	}
}

#[rstest]
fn test_if_none_match_on_get(resources: Resources) {
	// Arrange
	let request = TestRequest::get("/products/kettle").header(IF_NONE_MATCH, "W/\"product-v3\"");

	// Act
	let outcome = resources.dispatch(&request).unwrap();

	// Assert
	let Outcome::Respond(response) = outcome else {
		panic!("matching tag should short-circuit");
	};
	assert_eq!(response.status, StatusCode::NOT_MODIFIED);
	assert_eq!(response.headers[ETAG], "\"product-v3\"");
	assert_eq!(response.headers[VARY], "accept, accept-language");
	assert_eq!(response.headers[LAST_MODIFIED], http_date(0).as_str());
}

#[rstest]
#[case(Method::GET, "*", Some(StatusCode::NOT_MODIFIED))]
#[case(Method::PUT, "\"product-v3\"", Some(StatusCode::PRECONDITION_FAILED))]
#[case(Method::GET, "\"product-v2\", \"product-v1\"", None)]
fn test_if_none_match(resources: Resources, #[case] method: Method, #[case] tags: &str, #[case] expected: Option<StatusCode>) {
	let request = TestRequest::get("/products/kettle")
		.with_method(method)
		.header(IF_NONE_MATCH, tags);

	let outcome = resources.dispatch(&request).unwrap();

	assert_eq!(status(&outcome), expected);
}

#[rstest]
#[case("\"product-v3\"", None)]
#[case("W/\"product-v3\"", Some(StatusCode::PRECONDITION_FAILED))]
#[case("\"other\"", Some(StatusCode::PRECONDITION_FAILED))]
#[case("*", None)]
fn test_if_match(resources: Resources, #[case] tags: &str, #[case] expected: Option<StatusCode>) {
	let request = TestRequest::get("/products/kettle")
		.with_method(Method::PUT)
		.header(IF_MATCH, tags);

	let outcome = resources.dispatch(&request).unwrap();

	assert_eq!(status(&outcome), expected);
}

#[rstest]
#[case(IF_MODIFIED_SINCE, 0, Some(StatusCode::NOT_MODIFIED))]
#[case(IF_MODIFIED_SINCE, 60, Some(StatusCode::NOT_MODIFIED))]
#[case(IF_MODIFIED_SINCE, -60, None)]
#[case(IF_UNMODIFIED_SINCE, 0, None)]
#[case(IF_UNMODIFIED_SINCE, -60, Some(StatusCode::PRECONDITION_FAILED))]
fn test_date_validators(
	resources: Resources,
	#[case] header: http::HeaderName,
	#[case] offset_seconds: i64,
	#[case] expected: Option<StatusCode>,
) {
	let request = TestRequest::get("/products/kettle").header(header, &http_date(offset_seconds));

	let outcome = resources.dispatch(&request).unwrap();

	assert_eq!(status(&outcome), expected);
}

#[rstest]
fn test_unparseable_date_is_ignored(resources: Resources) {
	let request = TestRequest::get("/products/kettle").header(IF_MODIFIED_SINCE, "yesterday");
	let outcome = resources.dispatch(&request).unwrap();
	assert_eq!(status(&outcome), None);
}

#[rstest]
fn test_resources_without_validators_proceed(resources: Resources) {
	let request = TestRequest::get("/search").header(IF_NONE_MATCH, "*");
	let outcome = resources.dispatch(&request).unwrap();
	assert_eq!(status(&outcome), None);
}
