//! Error types for page-level provisioning

use thiserror::Error;

/// Errors while loading the engine scripts
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScriptError {
    /// Script element fired its error event
    #[error("Failed to load {src}")]
    LoadFailed { src: String },

    /// The load this caller was waiting on was dropped before it finished
    #[error("Load of {src} was abandoned")]
    Abandoned { src: String },

    /// Scripts loaded but the engine global is still undefined
    #[error("Engine still undefined after loading {src}")]
    EngineMissing { src: String },
}

/// Result type for script provisioning
pub type ScriptResult<T> = Result<T, ScriptError>;
