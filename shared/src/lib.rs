pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod store;
pub mod validation;

// Test utilities are only compiled when the feature is enabled so service
// crates can pull them into their own test builds.
#[cfg(feature = "test_utils")]
pub mod test_utils;
