//! Error handling for the textscan library
//!
//! Creation is the only fallible phase of the search contract: every error a
//! caller can see is produced while compiling a pattern into an engine. A
//! search that finds nothing reports `None`, never an error.

use thiserror::Error;

/// Main error type for the textscan library
#[derive(Error, Debug)]
pub enum TextScanError {
    /// Pattern rejected by the selected engine
    #[error("Invalid pattern: {message}")]
    InvalidPattern {
        /// Error message describing why the pattern was rejected
        message: String,
    },

    /// Compiled pattern state exceeded a configured memory cap
    #[error("Memory limit exceeded: compiled pattern would pass {size} bytes")]
    OutOfMemory {
        /// The configured limit in bytes
        size: usize,
    },
}

impl TextScanError {
    /// Create an invalid pattern error
    pub fn invalid_pattern<S: Into<String>>(message: S) -> Self {
        Self::InvalidPattern { message: message.into() }
    }

    /// Create an out of memory error
    pub fn out_of_memory(size: usize) -> Self {
        Self::OutOfMemory { size }
    }

    /// Check if this is a recoverable error
    ///
    /// A memory-cap rejection can succeed on retry with a larger configured
    /// limit; a rejected pattern never will.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::InvalidPattern { .. } => false,
            Self::OutOfMemory { .. } => true,
        }
    }

    /// Get the error category for logging/metrics
    pub fn category(&self) -> &'static str {
        match self {
            Self::InvalidPattern { .. } => "pattern",
            Self::OutOfMemory { .. } => "memory",
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, TextScanError>;
