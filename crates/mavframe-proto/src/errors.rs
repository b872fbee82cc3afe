//! Error types for MAVLink frame encoding and decoding.
//!
//! All errors are structured and carry the values needed to diagnose the
//! offending frame.

use thiserror::Error;

/// Frame-level errors raised while parsing or building a raw frame.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Fewer bytes are available than the header declares
    #[error("frame too short: expected at least {expected} bytes, got {actual}")]
    FrameTooShort {
        /// Bytes required by the declared layout
        expected: usize,
        /// Bytes actually available
        actual: usize,
    },

    /// First byte is not the marker of the requested protocol version
    #[error("invalid frame marker: {0:#04x}")]
    InvalidMagic(u8),

    /// V2 incompat flags carry bits this implementation does not understand
    #[error("unsupported incompat flags: {0:#04x}")]
    UnsupportedIncompatFlags(u8),

    /// Message id does not fit the id field of the protocol version
    #[error("message id {id} exceeds maximum {max}")]
    MessageIdOutOfRange {
        /// Requested message id
        id: u32,
        /// Largest id the version can carry
        max: u32,
    },

    /// Payload does not fit the 8-bit length field
    #[error("payload too large: {size} bytes exceeds maximum {max}")]
    PayloadTooLarge {
        /// Actual payload size
        size: usize,
        /// Maximum allowed size
        max: usize,
    },

    /// Signature timestamp does not fit in 48 bits
    #[error("signature timestamp {0} does not fit in 48 bits")]
    TimestampOutOfRange(u64),
}

/// Convenient Result type alias for frame operations
pub type Result<T> = std::result::Result<T, ProtocolError>;
