//! # uiinspect Config
//!
//! TOML configuration for the uiinspect CLI: resolver timing, backend choice
//! and logging.

mod error;
mod loader;
mod schema;
mod validator;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::*;
pub use validator::{ConfigValidator, ValidationError, ValidationResult, ValidationWarning};
