//! Fixed frame headers with zero-copy parsing.
//!
//! Both header layouts are byte-aligned, so they are cast directly from
//! untrusted wire bytes with `zerocopy`. Every bit pattern is a valid header;
//! semantic checks (marker, flags) happen in [`crate::RawFrame`].
//!
//! ```text
//! v1: ┌─────┬─────┬─────┬─────┬──────┬───────┐
//!     │ STX │ LEN │ SEQ │ SYS │ COMP │ MSGID │
//!     └─────┴─────┴─────┴─────┴──────┴───────┘
//!
//! v2: ┌─────┬─────┬──────────┬────────┬─────┬─────┬──────┬─────────────┐
//!     │ STX │ LEN │ INCOMPAT │ COMPAT │ SEQ │ SYS │ COMP │ MSGID (LE3) │
//!     └─────┴─────┴──────────┴────────┴─────┴─────┴──────┴─────────────┘
//! ```

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::errors::{ProtocolError, Result};

/// Sender identity and sequence number stamped on an outgoing frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MavHeader {
    /// Per-sender wrapping sequence number
    pub sequence: u8,
    /// Sending system
    pub system_id: u8,
    /// Sending component
    pub component_id: u8,
}

/// MAVLink 1 header, including the marker byte.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, KnownLayout, Immutable)]
pub(crate) struct V1Header {
    pub(crate) magic: u8,
    pub(crate) payload_length: u8,
    pub(crate) sequence: u8,
    pub(crate) system_id: u8,
    pub(crate) component_id: u8,
    pub(crate) message_id: u8,
}

impl V1Header {
    pub(crate) const SIZE: usize = 6;

    pub(crate) fn from_prefix(bytes: &[u8]) -> Result<&Self> {
        Self::ref_from_prefix(bytes)
            .map(|(header, _)| header)
            .map_err(|_| ProtocolError::FrameTooShort { expected: Self::SIZE, actual: bytes.len() })
    }
}

/// MAVLink 2 header, including the marker byte.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, KnownLayout, Immutable)]
pub(crate) struct V2Header {
    pub(crate) magic: u8,
    pub(crate) payload_length: u8,
    pub(crate) incompat_flags: u8,
    pub(crate) compat_flags: u8,
    pub(crate) sequence: u8,
    pub(crate) system_id: u8,
    pub(crate) component_id: u8,
    pub(crate) message_id: [u8; 3],
}

impl V2Header {
    pub(crate) const SIZE: usize = 10;

    pub(crate) fn from_prefix(bytes: &[u8]) -> Result<&Self> {
        Self::ref_from_prefix(bytes)
            .map(|(header, _)| header)
            .map_err(|_| ProtocolError::FrameTooShort { expected: Self::SIZE, actual: bytes.len() })
    }

    pub(crate) fn message_id(&self) -> u32 {
        let [lo, mid, hi] = self.message_id;
        u32::from_le_bytes([lo, mid, hi, 0])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_sizes() {
        assert_eq!(std::mem::size_of::<V1Header>(), V1Header::SIZE);
        assert_eq!(std::mem::size_of::<V2Header>(), V2Header::SIZE);
    }

    #[test]
    fn v2_message_id_little_endian() {
        let bytes = [0xFD, 0, 0, 0, 0, 0, 0, 0x2C, 0x01, 0x00];
        let header = V2Header::from_prefix(&bytes).expect("10 bytes");
        assert_eq!(header.message_id(), 300);
    }

    #[test]
    fn reject_short_buffer() {
        let result = V1Header::from_prefix(&[0xFE, 0x00, 0x00]);
        assert_eq!(result, Err(ProtocolError::FrameTooShort { expected: 6, actual: 3 }));
    }
}
