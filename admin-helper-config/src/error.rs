//! Configuration errors

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for configuration loading
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// File extension is not toml, yaml, yml or json
    #[error("unsupported configuration format: {path}")]
    UnsupportedFormat { path: PathBuf },

    /// A source could not be parsed or extracted
    #[error("configuration error: {0}")]
    Figment(#[from] Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

impl ConfigError {
    pub fn unsupported_format(path: &Path) -> Self {
        Self::UnsupportedFormat {
            path: path.to_path_buf(),
        }
    }
}
