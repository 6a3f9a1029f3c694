//! Configuration for starlight surfaces.
//!
//! Layered loading ([`ConfigLoader`]), the schema ([`StarlightConfig`]) and
//! validation ([`validate_config`]).

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, FileFormat, Profile, load_config, load_config_from_file};
#[cfg(feature = "help")]
pub use schema::HelpConfig;
pub use schema::{
    LogFormat, LogLevel, LogOutput, LogRotation, LoggingConfig, PaginationConfig,
    SpanEventConfig, StarlightConfig,
};
pub use validation::validate_config;
