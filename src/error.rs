//! # Error Types
//!
//! Custom error types for POV Capture using `thiserror`.

use thiserror::Error;

/// Main error type for POV Capture
#[derive(Debug, Error)]
pub enum CaptureError {
    /// Bad command line arguments
    #[error("invalid command line arguments")]
    Usage,

    /// Serial connection errors (open or read failure)
    #[error("Serial error: {0}")]
    Serial(String),

    /// The serial connection reached end of stream
    #[error("Serial connection closed by device")]
    SerialClosed,

    /// The state field of a record is not an integer
    #[error("Invalid state field {field:?}: {source}")]
    StateParse {
        field: String,
        #[source]
        source: std::num::ParseIntError,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for POV Capture
pub type Result<T> = std::result::Result<T, CaptureError>;
