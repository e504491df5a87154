//! Error types for hype

use crate::protocol::Type;
use thiserror::Error;

/// Result type alias for hype operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for hype
#[derive(Error, Debug)]
pub enum Error {
    /// A decoder tried to read past the end of the available bytes
    #[error("Short buffer: needed {needed} bytes, {remaining} remaining")]
    ShortBuffer { needed: usize, remaining: usize },

    /// The outermost layer type of a frame has no registered codec
    #[error("Unknown link type: {0}")]
    UnknownLinkType(Type),

    /// The caller assembled an empty or inconsistent layer list
    #[error("Packet construction error: {0}")]
    PacketConstruction(String),

    /// A header is structurally malformed (not merely truncated)
    #[error("Packet parsing error: {0}")]
    PacketParsing(String),

    /// Checksum verification failed for a decoded layer
    #[error("Checksum mismatch in {0} layer")]
    ChecksumMismatch(Type),

    /// Capture error
    #[error("Packet capture error: {0}")]
    Capture(String),

    /// Interface not found
    #[error("Interface '{0}' not found")]
    InterfaceNotFound(String),

    /// Invalid parameter error
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    /// Network I/O error
    #[error("Network I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a short buffer error
    pub fn short_buffer(needed: usize, remaining: usize) -> Self {
        Error::ShortBuffer { needed, remaining }
    }

    /// Create a packet construction error with a custom message
    pub fn construction<S: Into<String>>(msg: S) -> Self {
        Error::PacketConstruction(msg.into())
    }

    /// Create a packet parsing error with a custom message
    pub fn parsing<S: Into<String>>(msg: S) -> Self {
        Error::PacketParsing(msg.into())
    }

    /// Create a capture error with a custom message
    pub fn capture<S: Into<String>>(msg: S) -> Self {
        Error::Capture(msg.into())
    }

    /// Create an invalid parameter error
    pub fn invalid_parameter<S: Into<String>>(name: S, reason: S) -> Self {
        Error::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error came from a truncated frame
    pub fn is_short_buffer(&self) -> bool {
        matches!(self, Error::ShortBuffer { .. })
    }
}
