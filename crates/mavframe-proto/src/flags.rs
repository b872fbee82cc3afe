//! Incompatibility flags carried in the MAVLink v2 header.
//!
//! A receiver must drop a frame whose incompat flags contain a bit it does
//! not understand, because the bit may change how the rest of the frame is
//! laid out. Compat flags carry no such obligation and are kept as a raw byte.

use bitflags::bitflags;

bitflags! {
    /// V2 incompat flags (8 bits)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct IncompatFlags: u8 {
        /// A 13-byte signature block follows the checksum
        const SIGNED = 0b0000_0001;
    }
}

impl IncompatFlags {
    /// Create flags from the raw header byte, keeping unknown bits.
    #[must_use]
    pub const fn from_byte(byte: u8) -> Self {
        Self::from_bits_retain(byte)
    }

    /// Convert to raw byte value
    #[must_use]
    pub const fn to_byte(self) -> u8 {
        self.bits()
    }

    /// True if any bit outside the known set is present.
    #[must_use]
    pub const fn has_unknown_bits(self) -> bool {
        self.bits() & !Self::all().bits() != 0
    }

    /// True if the frame carries a signature block.
    #[must_use]
    pub const fn is_signed(self) -> bool {
        self.contains(Self::SIGNED)
    }
}

impl Default for IncompatFlags {
    fn default() -> Self {
        Self::empty()
    }
}
