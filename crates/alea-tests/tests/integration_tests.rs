//! Integration tests module that includes all integration test files.

#[path = "integration/event_algebra_tests.rs"]
mod event_algebra_tests;

#[path = "integration/bayes_engine_tests.rs"]
mod bayes_engine_tests;

#[path = "integration/scenario_tests.rs"]
mod scenario_tests;
