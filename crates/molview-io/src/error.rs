//! Error types for molecular file loading
//!
//! Covers parsing of the supported structure formats and retrieval of raw
//! file text over HTTP or from disk.

use thiserror::Error;

/// Errors that can occur while retrieving or parsing structure text
#[derive(Error, Debug)]
pub enum IoError {
    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error with location information
    #[error("Parse error at line {line}: {message}")]
    Parse {
        /// Line number where the error occurred (1-based)
        line: usize,
        /// Error message
        message: String,
    },

    /// Unknown or unsupported file format name
    #[error("Unknown format: {0}")]
    UnknownFormat(String),

    /// Unsupported feature in the file format
    #[error("Unsupported feature: {0}")]
    Unsupported(String),

    /// File is empty or contains no structure
    #[error("Empty file or no structure found")]
    EmptyFile,

    /// Decompression error
    #[error("Decompression error: {0}")]
    Decompression(String),

    /// Network error during retrieval
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// Server answered with a non-success status
    #[error("HTTP {status} for {url}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Requested URL
        url: String,
    },
}

impl IoError {
    /// Create a parse error at a specific line
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        IoError::Parse {
            line,
            message: message.into(),
        }
    }

    /// Create an unsupported feature error
    pub fn unsupported(feature: impl Into<String>) -> Self {
        IoError::Unsupported(feature.into())
    }

    /// Create a fetch error
    pub fn fetch(message: impl Into<String>) -> Self {
        IoError::Fetch(message.into())
    }

    /// Whether this error came from the transport rather than the content
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            IoError::Fetch(_) | IoError::Status { .. } | IoError::Io(_) | IoError::Decompression(_)
        )
    }
}

/// Result type for molecular file I/O operations
pub type IoResult<T> = Result<T, IoError>;
