//! Error types for configuration operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading or validating configuration.
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

    /// Failed to parse TOML
    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Failed to serialize TOML
    #[error("failed to serialize TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// Failed to parse or serialize JSON
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Layout parameters out of range
    #[error("invalid layout: {0}")]
    InvalidLayout(String),

    /// A patch node uses a type the registry does not know
    #[error("node '{id}' has unknown type '{node_type}'")]
    UnknownNodeType {
        /// Node id in the patch.
        id: String,
        /// The unrecognized type key.
        node_type: String,
    },

    /// Two patch nodes share an id
    #[error("duplicate node id '{0}' in patch")]
    DuplicateNode(String),
}

impl ConfigError {
    /// Create a read file error.
    pub fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::ReadFile {
            path: path.into(),
            source,
        }
    }

    /// Create an invalid layout error.
    pub fn invalid_layout(reason: impl Into<String>) -> Self {
        ConfigError::InvalidLayout(reason.into())
    }
}
