//! Unit tests for configuration loading and precedence.
//!
//! Tests are organised into modules by functional area:
//! - `helpers`: Shared test utilities
//! - `precedence`: Layer precedence tests
//! - `field_resolution`: Token, API key, repository, and author resolution
//! - `validation`: Pagination and URL validation

mod helpers;
mod precedence;
