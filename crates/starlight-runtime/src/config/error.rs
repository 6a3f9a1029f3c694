//! Errors raised while loading `StarlightConfig`.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    /// An explicitly requested file does not exist.
    #[error("Config file {0} does not exist")]
    MissingFile(PathBuf),

    /// No enabled format reads this file.
    #[error("Cannot read {path}: no enabled config format handles this extension")]
    UnknownFormat { path: PathBuf },

    /// The merged sources do not deserialize into the schema.
    #[error("Malformed configuration: {0}")]
    Extract(#[from] Box<figment::Error>),

    /// A value deserialized but is out of range or empty.
    #[error("Invalid `{field}`: {reason}")]
    Invalid { field: String, reason: String },
}

impl ConfigError {
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;
