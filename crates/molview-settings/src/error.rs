//! Error types for viewer settings

use thiserror::Error;

/// Errors that can occur when reading viewer settings
#[derive(Error, Debug, Clone)]
pub enum SettingError {
    /// Invalid value for a setting
    #[error("Invalid value for setting '{name}': {reason}")]
    InvalidValue { name: String, reason: String },

    /// Deserialization error
    #[error("Deserialization error: {0}")]
    Deserialization(String),
}

impl SettingError {
    /// Create an invalid value error
    pub fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        SettingError::InvalidValue {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for settings operations
pub type SettingResult<T> = Result<T, SettingError>;
