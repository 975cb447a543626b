//! Error types for the kind registry

use std::path::PathBuf;

use thiserror::Error;

/// Result type for registry operations
pub type Result<T> = std::result::Result<T, KindError>;

/// Kind registry errors
#[derive(Error, Debug)]
pub enum KindError {
    #[error("Failed to read schema document {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse schema document: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Schema document root must be a mapping of kind numbers to definitions")]
    NotAMapping,

    #[error("Embedded schema document not found: {0}")]
    EmbeddedMissing(String),

    #[error("Malformed kind key '{key}': not a base-10 integer")]
    MalformedKind { key: String },

    #[error("Malformed field chain in tag '{tag}': more than {limit} fields")]
    MalformedChain { tag: String, limit: usize },

    #[error("Kind not found: {0}")]
    NotFound(u32),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config_crate::ConfigError),
}

impl KindError {
    /// Whether this error aborts a whole document load.
    ///
    /// Load errors leave any previously installed snapshot in place.
    pub fn is_load_error(&self) -> bool {
        matches!(
            self,
            KindError::Io { .. } | KindError::Yaml(_) | KindError::NotAMapping | KindError::EmbeddedMissing(_)
        )
    }
}
