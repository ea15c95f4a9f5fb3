//! Configuration
//!
//! Loads and validates `typewriter` YAML files describing display
//! targets, their phrases and their timing.

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{ConfigLimits, ConfigLoader, LoadResult, LoadWarning, LoaderOptions};
pub use schema::*;
pub use validation::{ValidationResult, Validator};
