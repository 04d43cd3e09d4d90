//! Error handling for the codec library
//!
//! Fatal conditions of a coding session (bad configuration, unopenable files,
//! broken framing) are reported through [`CodecError`]. End of input and frame
//! loss are not errors and never surface here.

#![allow(missing_docs)]

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for codec operations
pub type Result<T> = std::result::Result<T, CodecError>;

/// Error type for bitstream and control-loop operations
#[derive(Error, Debug)]
pub enum CodecError {
    /// Coding mode outside 0..=8
    #[error("Invalid coding mode {mode}: use 0 to 8")]
    InvalidMode { mode: i32 },

    /// Invalid session configuration
    #[error("Invalid codec configuration: {details}")]
    InvalidConfig { details: String },

    /// A file could not be opened for the requested direction
    #[error("Cannot open '{}': {reason}", path.display())]
    ResourceUnavailable { path: PathBuf, reason: String },

    /// MIME/storage stream does not start with the AMR-WB magic number
    #[error("Invalid magic number: {}", String::from_utf8_lossy(found).escape_debug())]
    InvalidMagic { found: Vec<u8> },

    /// Frame type value that is not defined for the stream
    #[error("Invalid frame type: {value}")]
    InvalidFrameType { value: u16 },

    /// ITU record whose bit count matches no coding mode
    #[error("Invalid number of data bits received: {bits}")]
    InvalidFrameLength { bits: u16 },

    /// Malformed bitstream content
    #[error("Invalid bitstream format: {details}")]
    InvalidFormat { details: String },

    /// Invalid frame size
    #[error("Invalid frame size: expected {expected}, got {actual}")]
    InvalidFrameSize { expected: usize, actual: usize },

    /// Speech encoder failed
    #[error("Encoding failed: {reason}")]
    EncodingFailed { reason: String },

    /// Speech decoder failed
    #[error("Decoding failed: {reason}")]
    DecodingFailed { reason: String },

    /// I/O operation failed
    #[error("I/O operation failed: {reason}")]
    IoError { reason: String },
}

impl CodecError {
    /// Create a new invalid configuration error
    pub fn invalid_config(details: impl Into<String>) -> Self {
        Self::InvalidConfig {
            details: details.into(),
        }
    }

    /// Create a new invalid format error
    pub fn invalid_format(details: impl Into<String>) -> Self {
        Self::InvalidFormat {
            details: details.into(),
        }
    }

    /// Create a new resource error for `path`
    pub fn resource_unavailable(path: impl Into<PathBuf>, reason: impl fmt::Display) -> Self {
        Self::ResourceUnavailable {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a new encoding failed error
    pub fn encoding_failed(reason: impl Into<String>) -> Self {
        Self::EncodingFailed {
            reason: reason.into(),
        }
    }

    /// Create a new decoding failed error
    pub fn decoding_failed(reason: impl Into<String>) -> Self {
        Self::DecodingFailed {
            reason: reason.into(),
        }
    }

    /// Check if this error is recoverable
    ///
    /// Sessions are single pass, so only engine and I/O failures on a single
    /// frame are worth retrying by a caller that owns its own recovery.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::InvalidMode { .. }
            | Self::InvalidConfig { .. }
            | Self::ResourceUnavailable { .. }
            | Self::InvalidMagic { .. }
            | Self::InvalidFrameType { .. }
            | Self::InvalidFrameLength { .. }
            | Self::InvalidFormat { .. } => false,

            Self::InvalidFrameSize { .. }
            | Self::EncodingFailed { .. }
            | Self::DecodingFailed { .. }
            | Self::IoError { .. } => true,
        }
    }

    /// Get the error category
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidMode { .. } | Self::InvalidConfig { .. } => ErrorCategory::Configuration,

            Self::ResourceUnavailable { .. } => ErrorCategory::Resource,

            Self::InvalidMagic { .. }
            | Self::InvalidFrameType { .. }
            | Self::InvalidFrameLength { .. }
            | Self::InvalidFormat { .. } => ErrorCategory::Framing,

            Self::InvalidFrameSize { .. }
            | Self::EncodingFailed { .. }
            | Self::DecodingFailed { .. } => ErrorCategory::Processing,

            Self::IoError { .. } => ErrorCategory::Io,
        }
    }
}

/// Error category for grouping related errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Mode and parameter errors, raised before any frame is processed
    Configuration,
    /// Files that cannot be opened
    Resource,
    /// Stream framing errors
    Framing,
    /// Per-frame processing errors
    Processing,
    /// I/O related errors
    Io,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration => write!(f, "Configuration"),
            Self::Resource => write!(f, "Resource"),
            Self::Framing => write!(f, "Framing"),
            Self::Processing => write!(f, "Processing"),
            Self::Io => write!(f, "I/O"),
        }
    }
}

/// Convert from I/O errors
impl From<std::io::Error> for CodecError {
    fn from(error: std::io::Error) -> Self {
        Self::IoError {
            reason: error.to_string(),
        }
    }
}

/// Convert from parsing errors
impl From<std::num::ParseIntError> for CodecError {
    fn from(error: std::num::ParseIntError) -> Self {
        Self::InvalidConfig {
            details: format!("expected an integer: {error}"),
        }
    }
}
