//! Error types for colorimetry analysis.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for tonal operations.
pub type Result<T> = std::result::Result<T, TonalError>;

/// Errors raised by the analysis engine. Every variant carries the offending
/// value so callers can build a user-facing message from it.
#[derive(Error, Debug)]
pub enum TonalError {
    /// Malformed color string
    #[error("invalid color '{value}': {reason}")]
    Format {
        /// The string that failed to parse
        value: String,
        /// What was wrong with it
        reason: String,
    },

    /// Image could not be decoded
    #[error(
        "unsupported or corrupt image: {path}. Supported formats: PNG, JPEG, BMP, GIF"
    )]
    UnsupportedFormat {
        /// Source of the image data
        path: String,
        #[source]
        source: image::ImageError,
    },

    /// Image text is not valid base64
    #[error("invalid base64 image data: {source}")]
    Base64 {
        #[source]
        source: base64::DecodeError,
    },

    /// Image file does not exist
    #[error("file not found: {}", path.display())]
    FileNotFound {
        /// Path that was requested
        path: PathBuf,
    },

    /// Out-of-range parameter
    #[error("invalid parameter {parameter} = {value}: {reason}")]
    InvalidParameter {
        /// Parameter name
        parameter: String,
        /// Rejected value
        value: String,
        /// Accepted range or constraint
        reason: String,
    },

    /// I/O failure while reading or writing a document
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization or parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TonalError {
    /// Create a format error for a color string.
    pub fn format(value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Format {
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid parameter error.
    pub fn invalid_parameter(
        parameter: impl Into<String>,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidParameter {
            parameter: parameter.into(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    /// Create an I/O error bound to a path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
