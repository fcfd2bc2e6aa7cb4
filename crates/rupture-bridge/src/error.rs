//! Error types for the presentation bridge.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur loading or validating a [`BridgeConfig`](crate::BridgeConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    ReadFile {
        /// Path of the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a file
    #[error("failed to write file '{path}': {source}")]
    WriteFile {
        /// Path of the file that could not be written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Failed to serialize TOML
    #[error("failed to serialize TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// A field holds a value the poller cannot run with
    #[error("invalid value for '{field}': {reason}")]
    Invalid {
        /// Name of the offending field.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

impl ConfigError {
    /// Create a read file error.
    pub fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::ReadFile {
            path: path.into(),
            source,
        }
    }

    /// Create a write file error.
    pub fn write_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::WriteFile {
            path: path.into(),
            source,
        }
    }

    /// Create an invalid value error.
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Why a script could not be delivered to the presentation surface.
///
/// Never fatal: the poller logs it, counts it, and carries on.
#[derive(Debug, Error)]
pub enum SurfaceError {
    /// The surface rejected or failed to run the script
    #[error("script evaluation failed: {0}")]
    Evaluate(String),

    /// The surface is gone (window closed, pipe broken)
    #[error("presentation surface closed")]
    Closed,

    /// I/O failure writing the script out
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Top-level error for bridge setup.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be loaded or is invalid
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The poller thread could not be started
    #[error("failed to spawn poller thread: {0}")]
    Spawn(#[source] std::io::Error),
}

/// Result type for bridge operations.
pub type Result<T> = std::result::Result<T, Error>;
