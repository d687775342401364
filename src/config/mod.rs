//! Configuration module
//!
//! Loads and validates the service configuration: gateway credentials, the
//! sender number, the admin allow-list and the attack interval.

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{ConfigLoader, LoadResult, LoadWarning, LoaderOptions};
pub use schema::*;
pub use validation::{ValidationResult, Validator};
