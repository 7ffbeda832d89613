//! Error types for the setup procedure
//!
//! Only a handful of these ever reach the caller: the lockdown guard and
//! failures to load or persist the configuration. Everything else is caught
//! by the stage that raised it and downgraded to a warning notice.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Setup error type
///
/// Serializable so a frontend can render it next to the setup report.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "message")]
pub enum SetupError {
    #[error("In lockdown, doing nothing.")]
    Lockdown,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Keyring error: {0}")]
    Keyring(String),

    #[error("Tag error: {0}")]
    Tag(String),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error("{0}")]
    Other(String),
}

impl From<std::io::Error> for SetupError {
    fn from(err: std::io::Error) -> Self {
        SetupError::Io(err.to_string())
    }
}

impl From<toml::de::Error> for SetupError {
    fn from(err: toml::de::Error) -> Self {
        SetupError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for SetupError {
    fn from(err: toml::ser::Error) -> Self {
        SetupError::Config(err.to_string())
    }
}

impl From<rusqlite::Error> for SetupError {
    fn from(err: rusqlite::Error) -> Self {
        SetupError::Database(err.to_string())
    }
}

impl From<r2d2::Error> for SetupError {
    fn from(err: r2d2::Error) -> Self {
        SetupError::Database(format!("Connection pool error: {}", err))
    }
}

impl From<String> for SetupError {
    fn from(err: String) -> Self {
        SetupError::Other(err)
    }
}

impl From<&str> for SetupError {
    fn from(err: &str) -> Self {
        SetupError::Other(err.to_string())
    }
}

/// Result type alias using SetupError
pub type Result<T> = std::result::Result<T, SetupError>;
