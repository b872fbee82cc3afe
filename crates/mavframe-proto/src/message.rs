//! Payload contract between the framing layer and message types.
//!
//! Message types are defined outside this crate (a dialect). The framing layer
//! only needs each type's id, checksum seed, full payload size, and a way to
//! convert to and from payload bytes.

use thiserror::Error;

/// Errors raised while decoding a payload into a typed message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Payload is shorter than the message's encoded size
    #[error("payload too short: expected {expected} bytes, got {actual}")]
    PayloadTooShort {
        /// Encoded size of the message
        expected: usize,
        /// Bytes available
        actual: usize,
    },

    /// A field holds a value outside its allowed range
    #[error("invalid value {value} for field `{field}`")]
    InvalidValue {
        /// Field name
        field: &'static str,
        /// Raw value as read from the wire
        value: u64,
    },
}

impl DecodeError {
    /// Fail with [`DecodeError::PayloadTooShort`] unless `payload` holds at
    /// least `expected` bytes.
    pub fn ensure_len(payload: &[u8], expected: usize) -> Result<(), Self> {
        if payload.len() < expected {
            return Err(Self::PayloadTooShort { expected, actual: payload.len() });
        }
        Ok(())
    }
}

/// A typed MAVLink message.
///
/// `encode` must produce exactly `ENCODED_LEN` bytes in wire field order.
/// `decode` receives a payload already zero-extended to `ENCODED_LEN`.
pub trait MavMessage: Sized {
    /// Message id (8-bit for v1-capable messages, 24-bit otherwise)
    const ID: u32;

    /// Checksum seed derived from the message definition
    const CRC_EXTRA: u8;

    /// Full payload size before v2 truncation
    const ENCODED_LEN: usize;

    /// Serialize to payload bytes.
    fn encode(&self) -> Vec<u8>;

    /// Parse from payload bytes.
    fn decode(payload: &[u8]) -> Result<Self, DecodeError>;
}
