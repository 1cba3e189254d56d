//! Layered configuration loading (§10.3): built-in defaults, environment
//! YAML, then environment variables, merged through `figment` into a single
//! typed config struct validated at startup.

pub mod engine;
pub mod error;

pub use engine::ConfigEngine;
pub use error::{ConfigError, Result};
