//! Error types for the field registry

use thiserror::Error;

/// Result type for field registry operations
pub type Result<T> = std::result::Result<T, FieldsError>;

/// Errors that can occur in field registry operations
#[derive(Debug, Error)]
pub enum FieldsError {
    /// No interface settings registered for the view
    #[error("interface not configured for module '{module}', view '{view}'")]
    NotConfigured { module: String, view: String },

    /// Field not present in the view's settings
    #[error("field not configured: {code}")]
    FieldNotFound { code: String },

    /// YAML parse error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl FieldsError {
    /// Every registry error is a programmer error, never a user-facing one.
    pub fn is_configuration_error(&self) -> bool {
        true
    }
}
