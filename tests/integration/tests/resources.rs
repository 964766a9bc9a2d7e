// Resource dispatch integration tests
// Each test file in resources/ subdirectory is explicitly included with #[path] attribute

#[path = "resources/routing.rs"]
mod routing;

#[path = "resources/negotiation.rs"]
mod negotiation;

#[path = "resources/conditional.rs"]
mod conditional;

#[path = "resources/links.rs"]
mod links;
