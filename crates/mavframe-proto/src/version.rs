//! Protocol versions and their start-of-frame markers.

use std::fmt;

use crate::header::{V1Header, V2Header};

/// MAVLink protocol version, identified on the wire by its marker byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProtocolVersion {
    /// MAVLink 1: 8-bit message ids, no flags, no signing
    V1,
    /// MAVLink 2: 24-bit message ids, flags, optional signing
    V2,
}

impl ProtocolVersion {
    /// Marker byte of MAVLink 1 frames
    pub const V1_MAGIC: u8 = 0xFE;

    /// Marker byte of MAVLink 2 frames
    pub const V2_MAGIC: u8 = 0xFD;

    /// Look up the version whose marker is `byte`.
    #[must_use]
    pub const fn from_magic(byte: u8) -> Option<Self> {
        match byte {
            Self::V1_MAGIC => Some(Self::V1),
            Self::V2_MAGIC => Some(Self::V2),
            _ => None,
        }
    }

    /// Marker byte for this version
    #[must_use]
    pub const fn magic(self) -> u8 {
        match self {
            Self::V1 => Self::V1_MAGIC,
            Self::V2 => Self::V2_MAGIC,
        }
    }

    /// Header size including the marker byte
    #[must_use]
    pub const fn header_size(self) -> usize {
        match self {
            Self::V1 => V1Header::SIZE,
            Self::V2 => V2Header::SIZE,
        }
    }

    /// Largest message id this version can carry
    #[must_use]
    pub const fn max_message_id(self) -> u32 {
        match self {
            Self::V1 => 0xFF,
            Self::V2 => 0x00FF_FFFF,
        }
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::V1 => f.write_str("v1"),
            Self::V2 => f.write_str("v2"),
        }
    }
}
