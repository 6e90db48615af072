//! Error types for the scene crate

use std::fmt;

use thiserror::Error;

use molview_io::{Format, IoError};

/// Errors reported by a rendering engine
#[derive(Debug, Error)]
pub enum EngineError {
    /// Engine is not present or its script failed to load
    #[error("Engine unavailable: {0}")]
    Unavailable(String),

    /// Viewer could not be bound to the mount
    #[error("Viewer init failed: {0}")]
    ViewerInit(String),

    /// Text was rejected as a model of this format
    #[error("Failed to parse as {format}: {message}")]
    Parse { format: Format, message: String },

    /// Native download could not retrieve the file
    #[error("Download of {url} failed")]
    Download {
        url: String,
        #[source]
        source: IoError,
    },

    /// Call shape or argument the engine does not accept
    #[error("Unsupported by engine: {0}")]
    Unsupported(String),
}

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

/// Short messages shown in place of a viewer
///
/// These are the only failure texts a page visitor ever sees; details go
/// to the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InlineMessage {
    NoFileUrl,
    ViewerInitFailed,
    LoadFailed,
    EngineLoadFailed,
    NoAtomsFound,
}

impl InlineMessage {
    /// Text placed in the mount
    pub fn text(&self) -> &'static str {
        match self {
            InlineMessage::NoFileUrl => "No file URL",
            InlineMessage::ViewerInitFailed => "Viewer init failed",
            InlineMessage::LoadFailed => "Load failed — see console",
            InlineMessage::EngineLoadFailed => "3Dmol load failed",
            InlineMessage::NoAtomsFound => "No atoms found — check file/type",
        }
    }
}

impl fmt::Display for InlineMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

/// Terminal failures of a viewer session
#[derive(Debug, Error)]
pub enum SessionError {
    /// The mount names no source file
    #[error("No source URL")]
    NoSource,

    /// Engine script failed to load, or the engine is still absent
    #[error("Engine unavailable")]
    Engine(#[source] EngineError),

    /// Engine refused to create a viewer
    #[error("Viewer creation failed")]
    ViewerInit(#[source] EngineError),

    /// Fetch rejected or returned a non-success status
    #[error("Failed to fetch {url}")]
    Transport {
        url: String,
        #[source]
        source: IoError,
    },

    /// No candidate and no native download produced atoms
    #[error("No atoms in {url} (hint: {hint})")]
    NoAtoms { url: String, hint: Format },
}

impl SessionError {
    /// The message shown in place of the viewer
    pub fn inline_message(&self) -> InlineMessage {
        match self {
            SessionError::NoSource => InlineMessage::NoFileUrl,
            SessionError::Engine(_) => InlineMessage::EngineLoadFailed,
            SessionError::ViewerInit(_) => InlineMessage::ViewerInitFailed,
            SessionError::Transport { .. } => InlineMessage::LoadFailed,
            SessionError::NoAtoms { .. } => InlineMessage::NoAtomsFound,
        }
    }
}

/// Result type for session operations
pub type SessionResult<T> = Result<T, SessionError>;
