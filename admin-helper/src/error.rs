//! Error types for the admin controllers
//!
//! Only programmer and infrastructure errors travel as `Err`. Rights
//! denials, validation failures and rejected writes are user-facing: they go
//! to the flash channel and show up in the page or redirect the controller returns.

use admin_helper_config::ConfigError;
use admin_helper_fields::FieldsError;
use admin_helper_store::StoreError;
use thiserror::Error;

/// Result type for admin operations
pub type Result<T> = std::result::Result<T, AdminError>;

#[derive(Debug, Error)]
pub enum AdminError {
    /// Registry lookup failed
    #[error(transparent)]
    Fields(#[from] FieldsError),

    /// Entity resolution or storage failure
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Configuration could not be loaded
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Field code has no configuration in the view
    #[error("can't create widget for the code \"{code}\"")]
    NoWidget { code: String },

    /// Custom widget name not registered with the factory
    #[error("unknown widget kind '{kind}' for field '{code}'")]
    UnknownWidgetKind { code: String, kind: String },

    /// Gateway accepted an insert without reporting the new id
    #[error("gateway for '{entity}' added a record without returning its id")]
    MissingId { entity: String },
}

impl AdminError {
    /// Whether this is a programmer error in the admin wiring.
    ///
    /// Configuration errors should abort bootstrap; everything else is a
    /// runtime failure of the current request.
    pub fn is_configuration_error(&self) -> bool {
        match self {
            Self::Fields(e) => e.is_configuration_error(),
            Self::Store(e) => e.is_configuration_error(),
            Self::Config(_) | Self::NoWidget { .. } | Self::UnknownWidgetKind { .. } => true,
            Self::MissingId { .. } => false,
        }
    }
}
