//! Error types for entity storage

use std::path::PathBuf;
use thiserror::Error;

/// Result type for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors raised by gateways and the entity registry.
///
/// Rejected writes are not errors: they come back as a failed
/// [`PersistResult`](crate::PersistResult) carrying user-facing messages.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No gateway registered for the entity token
    #[error("unresolvable entity: {token}")]
    UnresolvableEntity { token: String },

    /// A stored record could not be decoded
    #[error("corrupt record at {path}: {message}")]
    Corrupt { path: PathBuf, message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl StoreError {
    /// Whether this is a wiring mistake rather than a runtime storage failure.
    pub fn is_configuration_error(&self) -> bool {
        matches!(self, Self::UnresolvableEntity { .. })
    }
}
