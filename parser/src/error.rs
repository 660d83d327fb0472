//! Error types for loading, converting and writing profile files.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur around a conversion.
///
/// Malformed log lines never produce an error; they are skipped by the
/// grammars. Everything here happens at the file boundary.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// The input file could not be read.
    #[error("failed to read '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The output file or its parent directory could not be written.
    #[error("failed to write '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Configuration is present but unusable.
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Convenience alias for results with [`ConvertError`].
pub type Result<T> = std::result::Result<T, ConvertError>;
