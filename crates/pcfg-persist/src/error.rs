//! Persistence errors

use pcfg_model::{ModelError, QualifiedName};
use pcfg_typedef::TypeError;
use std::path::PathBuf;

/// Failure while reading or writing documents
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    /// File system failure
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File or directory involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Invalid JSON document
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid YAML document
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Invalid project configuration
    #[error("invalid configuration: {0}")]
    Toml(#[from] toml::de::Error),

    /// File extension names no known format
    #[error("unsupported document format: {0}")]
    UnsupportedFormat(PathBuf),

    /// Fingerprint text is not a 32-byte hex string
    #[error("invalid fingerprint: {0}")]
    InvalidFingerprint(String),

    /// Two documents describe the same object
    #[error("{name} is defined in {first} and {second}")]
    DuplicateObject {
        /// Object name
        name: QualifiedName,
        /// Document loaded first
        first: PathBuf,
        /// Document loaded second
        second: PathBuf,
    },

    /// Document content violates the model
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Type files do not form a valid type model
    #[error(transparent)]
    Type(#[from] TypeError),
}

impl PersistError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
