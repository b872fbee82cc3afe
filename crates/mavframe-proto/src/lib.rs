//! Wire format for MAVLink v1 and v2.
//!
//! A frame is a small fixed header, an undecoded payload, a CRC-16 checksum,
//! and for signed v2 frames a 13-byte signature block. This crate builds and
//! parses those frames without knowing any message definitions: the checksum
//! seed and payload layout come from a dialect through the [`MavMessage`]
//! contract.
//!
//! # Security
//!
//! Headers are cast from wire bytes with compile-time verified layouts via
//! `zerocopy`. Every declared length is checked against the available bytes
//! before any slice is taken. Signatures are verified against a shared
//! 32-byte key; replay protection is the caller's concern.
#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod crc;
pub mod errors;
pub mod flags;
pub mod frame;
pub mod header;
pub mod message;
pub mod signature;
pub mod version;

pub use crc::calculate_crc;
pub use errors::{ProtocolError, Result};
pub use flags::IncompatFlags;
pub use frame::{CHECKSUM_SIZE, MAX_FRAME_SIZE, MAX_PAYLOAD_SIZE, RawFrame, truncate_zeros};
pub use header::MavHeader;
pub use message::{DecodeError, MavMessage};
pub use signature::{SIGNATURE_SIZE, SecretKey, Signature, SigningParams};
pub use version::ProtocolVersion;
