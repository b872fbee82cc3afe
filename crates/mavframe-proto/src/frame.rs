//! Raw MAVLink frame: header, undecoded payload, checksum, optional signature.
//!
//! A `RawFrame` is the transport-layer unit. It validates structure only; the
//! payload stays as bytes until a dialect decodes it.
//!
//! # Invariants
//!
//! - **Size Consistency**: `payload_length()` always equals `payload().len()`.
//!   Both views are slices of the same immutable wire buffer.
//!
//! - **Immutability**: frames are never modified after construction. The
//!   encoders compute the checksum and signature before the frame exists.
//!
//! - **No Implicit Trust**: decoding does not check the checksum, because the
//!   `crc_extra` seed belongs to the dialect. Callers must run
//!   [`RawFrame::validate_crc`] before trusting a decoded frame.

use std::fmt;

use bytes::{BufMut, Bytes, BytesMut};
use zerocopy::IntoBytes;

use crate::{
    crc::calculate_crc,
    errors::{ProtocolError, Result},
    flags::IncompatFlags,
    header::{MavHeader, V1Header, V2Header},
    signature::{SIGNATURE_SIZE, SecretKey, Signature, SigningParams},
    version::ProtocolVersion,
};

/// Size of the trailing checksum
pub const CHECKSUM_SIZE: usize = 2;

/// Largest payload the 8-bit length field can describe
pub const MAX_PAYLOAD_SIZE: usize = 255;

/// Largest possible frame: signed v2 with a full payload
pub const MAX_FRAME_SIZE: usize = V2Header::SIZE + MAX_PAYLOAD_SIZE + CHECKSUM_SIZE + SIGNATURE_SIZE;

/// One physical MAVLink frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFrame {
    version: ProtocolVersion,
    incompat_flags: IncompatFlags,
    compat_flags: u8,
    sequence: u8,
    system_id: u8,
    component_id: u8,
    message_id: u32,
    payload: Bytes,
    checksum: u16,
    signature: Option<Signature>,
    bytes: Bytes,
}

impl RawFrame {
    /// Total wire size of a frame with the given header values.
    #[must_use]
    pub const fn wire_size(
        version: ProtocolVersion,
        payload_length: u8,
        incompat_flags: IncompatFlags,
    ) -> usize {
        let signature = match version {
            ProtocolVersion::V2 if incompat_flags.is_signed() => SIGNATURE_SIZE,
            _ => 0,
        };
        version.header_size() + payload_length as usize + CHECKSUM_SIZE + signature
    }

    /// Decode a frame of either version, dispatching on the marker byte.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let Some(&magic) = bytes.first() else {
            return Err(ProtocolError::FrameTooShort { expected: 1, actual: 0 });
        };

        match ProtocolVersion::from_magic(magic) {
            Some(ProtocolVersion::V1) => Self::decode_v1(bytes),
            Some(ProtocolVersion::V2) => Self::decode_v2(bytes),
            None => Err(ProtocolError::InvalidMagic(magic)),
        }
    }

    /// Decode a MAVLink 1 frame starting at its marker byte.
    ///
    /// Bytes past the end of the frame are ignored.
    ///
    /// # Errors
    ///
    /// - [`ProtocolError::FrameTooShort`] if the header or the declared
    ///   payload and checksum are not all present
    /// - [`ProtocolError::InvalidMagic`] if the marker is not `0xFE`
    pub fn decode_v1(bytes: &[u8]) -> Result<Self> {
        let header = V1Header::from_prefix(bytes)?;
        if header.magic != ProtocolVersion::V1_MAGIC {
            return Err(ProtocolError::InvalidMagic(header.magic));
        }

        let total = Self::wire_size(ProtocolVersion::V1, header.payload_length, IncompatFlags::empty());
        let raw = Self::copy_frame(bytes, total)?;
        let payload_end = V1Header::SIZE + usize::from(header.payload_length);

        Ok(Self {
            version: ProtocolVersion::V1,
            incompat_flags: IncompatFlags::empty(),
            compat_flags: 0,
            sequence: header.sequence,
            system_id: header.system_id,
            component_id: header.component_id,
            message_id: u32::from(header.message_id),
            payload: raw.slice(V1Header::SIZE..payload_end),
            checksum: u16::from_le_bytes([raw[payload_end], raw[payload_end + 1]]),
            signature: None,
            bytes: raw,
        })
    }

    /// Decode a MAVLink 2 frame starting at its marker byte.
    ///
    /// The signature block is read when the `SIGNED` incompat flag is set.
    /// Bytes past the end of the frame are ignored.
    ///
    /// # Errors
    ///
    /// - [`ProtocolError::FrameTooShort`] if the header, payload, checksum or
    ///   signature are not all present
    /// - [`ProtocolError::InvalidMagic`] if the marker is not `0xFD`
    /// - [`ProtocolError::UnsupportedIncompatFlags`] if unknown incompat bits
    ///   are set, since they may change the frame layout
    pub fn decode_v2(bytes: &[u8]) -> Result<Self> {
        let header = V2Header::from_prefix(bytes)?;
        if header.magic != ProtocolVersion::V2_MAGIC {
            return Err(ProtocolError::InvalidMagic(header.magic));
        }

        let incompat_flags = IncompatFlags::from_byte(header.incompat_flags);
        if incompat_flags.has_unknown_bits() {
            return Err(ProtocolError::UnsupportedIncompatFlags(header.incompat_flags));
        }

        let total = Self::wire_size(ProtocolVersion::V2, header.payload_length, incompat_flags);
        let raw = Self::copy_frame(bytes, total)?;
        let payload_end = V2Header::SIZE + usize::from(header.payload_length);
        let checksum_end = payload_end + CHECKSUM_SIZE;

        let signature = if incompat_flags.is_signed() {
            Some(Signature::from_bytes(&raw[checksum_end..])?)
        } else {
            None
        };

        Ok(Self {
            version: ProtocolVersion::V2,
            incompat_flags,
            compat_flags: header.compat_flags,
            sequence: header.sequence,
            system_id: header.system_id,
            component_id: header.component_id,
            message_id: header.message_id(),
            payload: raw.slice(V2Header::SIZE..payload_end),
            checksum: u16::from_le_bytes([raw[payload_end], raw[payload_end + 1]]),
            signature,
            bytes: raw,
        })
    }

    /// Build a MAVLink 1 frame.
    ///
    /// # Errors
    ///
    /// - [`ProtocolError::MessageIdOutOfRange`] if `message_id > 255`
    /// - [`ProtocolError::PayloadTooLarge`] if the payload exceeds 255 bytes
    pub fn encode_v1(
        header: MavHeader,
        message_id: u32,
        payload: &[u8],
        crc_extra: u8,
    ) -> Result<Self> {
        check_message_id(ProtocolVersion::V1, message_id)?;
        let payload_length = check_payload(payload)?;

        let wire = V1Header {
            magic: ProtocolVersion::V1_MAGIC,
            payload_length,
            sequence: header.sequence,
            system_id: header.system_id,
            component_id: header.component_id,
            message_id: message_id as u8,
        };

        let total = Self::wire_size(ProtocolVersion::V1, payload_length, IncompatFlags::empty());
        let mut buf = BytesMut::with_capacity(total);
        buf.put_slice(wire.as_bytes());
        buf.put_slice(payload);
        let checksum = calculate_crc(&buf[1..], crc_extra);
        buf.put_u16_le(checksum);

        let raw = buf.freeze();
        Ok(Self {
            version: ProtocolVersion::V1,
            incompat_flags: IncompatFlags::empty(),
            compat_flags: 0,
            sequence: header.sequence,
            system_id: header.system_id,
            component_id: header.component_id,
            message_id,
            payload: raw.slice(V1Header::SIZE..V1Header::SIZE + payload.len()),
            checksum,
            signature: None,
            bytes: raw,
        })
    }

    /// Build an unsigned MAVLink 2 frame.
    ///
    /// Trailing zero bytes of the payload are stripped, keeping at least one
    /// byte. Receivers restore them with [`RawFrame::payload_extended`].
    ///
    /// # Errors
    ///
    /// - [`ProtocolError::MessageIdOutOfRange`] if `message_id` exceeds 24 bits
    /// - [`ProtocolError::PayloadTooLarge`] if the payload exceeds 255 bytes
    pub fn encode_unsigned_v2(
        header: MavHeader,
        message_id: u32,
        payload: &[u8],
        crc_extra: u8,
    ) -> Result<Self> {
        Self::encode_v2(header, message_id, payload, crc_extra, None)
    }

    /// Build a signed MAVLink 2 frame.
    ///
    /// Same payload handling as [`RawFrame::encode_unsigned_v2`], with the
    /// `SIGNED` flag set and a signature block appended.
    ///
    /// # Errors
    ///
    /// As [`RawFrame::encode_unsigned_v2`], plus
    /// [`ProtocolError::TimestampOutOfRange`] if the timestamp exceeds 48 bits.
    pub fn encode_signed_v2(
        header: MavHeader,
        message_id: u32,
        payload: &[u8],
        crc_extra: u8,
        signing: &SigningParams<'_>,
    ) -> Result<Self> {
        Self::encode_v2(header, message_id, payload, crc_extra, Some(signing))
    }

    fn encode_v2(
        header: MavHeader,
        message_id: u32,
        payload: &[u8],
        crc_extra: u8,
        signing: Option<&SigningParams<'_>>,
    ) -> Result<Self> {
        check_message_id(ProtocolVersion::V2, message_id)?;
        check_payload(payload)?;

        let payload = truncate_zeros(payload);
        let payload_length = payload.len() as u8;
        let incompat_flags =
            if signing.is_some() { IncompatFlags::SIGNED } else { IncompatFlags::empty() };

        let [id_lo, id_mid, id_hi, _] = message_id.to_le_bytes();
        let wire = V2Header {
            magic: ProtocolVersion::V2_MAGIC,
            payload_length,
            incompat_flags: incompat_flags.to_byte(),
            compat_flags: 0,
            sequence: header.sequence,
            system_id: header.system_id,
            component_id: header.component_id,
            message_id: [id_lo, id_mid, id_hi],
        };

        let total = Self::wire_size(ProtocolVersion::V2, payload_length, incompat_flags);
        let mut buf = BytesMut::with_capacity(total);
        buf.put_slice(wire.as_bytes());
        buf.put_slice(payload);
        let checksum = calculate_crc(&buf[1..], crc_extra);
        buf.put_u16_le(checksum);

        let signature = match signing {
            Some(params) => {
                let signature = Signature::sign(&buf, params)?;
                buf.put_slice(&signature.to_bytes());
                Some(signature)
            },
            None => None,
        };

        let raw = buf.freeze();
        Ok(Self {
            version: ProtocolVersion::V2,
            incompat_flags,
            compat_flags: 0,
            sequence: header.sequence,
            system_id: header.system_id,
            component_id: header.component_id,
            message_id,
            payload: raw.slice(V2Header::SIZE..V2Header::SIZE + payload.len()),
            checksum,
            signature,
            bytes: raw,
        })
    }

    /// Recompute the checksum with the dialect's seed and compare.
    #[must_use]
    pub fn validate_crc(&self, crc_extra: u8) -> bool {
        calculate_crc(&self.bytes[1..self.checksum_offset()], crc_extra) == self.checksum
    }

    /// Verify the signature against `key`. Unsigned frames never verify.
    #[must_use]
    pub fn validate_signature(&self, key: &SecretKey) -> bool {
        self.signature.as_ref().is_some_and(|signature| {
            signature.verify(&self.bytes[..self.checksum_offset() + CHECKSUM_SIZE], key)
        })
    }

    /// Payload zero-extended to `size` bytes.
    ///
    /// Restores the trailing zeros a v2 sender truncated. Payloads already at
    /// least `size` bytes long are returned unchanged.
    #[must_use]
    pub fn payload_extended(&self, size: usize) -> Vec<u8> {
        let mut payload = self.payload.to_vec();
        if payload.len() < size {
            payload.resize(size, 0);
        }
        payload
    }

    /// Protocol version
    #[must_use]
    pub fn version(&self) -> ProtocolVersion {
        self.version
    }

    /// Payload length as carried in the header
    #[must_use]
    pub fn payload_length(&self) -> u8 {
        self.payload.len() as u8
    }

    /// Incompat flags (always empty for v1)
    #[must_use]
    pub fn incompat_flags(&self) -> IncompatFlags {
        self.incompat_flags
    }

    /// Compat flags (always zero for v1)
    #[must_use]
    pub fn compat_flags(&self) -> u8 {
        self.compat_flags
    }

    /// Sequence number
    #[must_use]
    pub fn sequence(&self) -> u8 {
        self.sequence
    }

    /// Sending system id
    #[must_use]
    pub fn system_id(&self) -> u8 {
        self.system_id
    }

    /// Sending component id
    #[must_use]
    pub fn component_id(&self) -> u8 {
        self.component_id
    }

    /// Sequence, system and component ids
    #[must_use]
    pub fn header(&self) -> MavHeader {
        MavHeader {
            sequence: self.sequence,
            system_id: self.system_id,
            component_id: self.component_id,
        }
    }

    /// Message id
    #[must_use]
    pub fn message_id(&self) -> u32 {
        self.message_id
    }

    /// Undecoded payload exactly as carried on the wire
    #[must_use]
    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// Checksum as carried on the wire
    #[must_use]
    pub fn checksum(&self) -> u16 {
        self.checksum
    }

    /// Signature block, if the frame is signed
    #[must_use]
    pub fn signature(&self) -> Option<&Signature> {
        self.signature.as_ref()
    }

    /// True if the frame carries a signature block
    #[must_use]
    pub fn is_signed(&self) -> bool {
        self.signature.is_some()
    }

    /// Complete wire encoding of the frame
    #[must_use]
    pub fn raw_bytes(&self) -> &Bytes {
        &self.bytes
    }

    fn checksum_offset(&self) -> usize {
        self.version.header_size() + self.payload.len()
    }

    fn copy_frame(bytes: &[u8], total: usize) -> Result<Bytes> {
        bytes
            .get(..total)
            .map(Bytes::copy_from_slice)
            .ok_or(ProtocolError::FrameTooShort { expected: total, actual: bytes.len() })
    }
}

impl fmt::Display for RawFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} seq={} sys={} comp={} msgid={} len={} crc={:#06x}",
            self.version,
            self.sequence,
            self.system_id,
            self.component_id,
            self.message_id,
            self.payload.len(),
            self.checksum,
        )?;
        if let Some(signature) = &self.signature {
            write!(f, " link={} ts={}", signature.link_id, signature.timestamp)?;
        }
        Ok(())
    }
}

/// Strip trailing zero bytes, never going below one byte.
///
/// Only zero bytes are removed, so the original payload is recovered by
/// zero-extending to its declared size.
#[must_use]
pub fn truncate_zeros(payload: &[u8]) -> &[u8] {
    let end = payload.iter().rposition(|&b| b != 0).map_or(1, |last| last + 1);
    &payload[..end.min(payload.len())]
}

fn check_message_id(version: ProtocolVersion, message_id: u32) -> Result<()> {
    let max = version.max_message_id();
    if message_id > max {
        return Err(ProtocolError::MessageIdOutOfRange { id: message_id, max });
    }
    Ok(())
}

fn check_payload(payload: &[u8]) -> Result<u8> {
    u8::try_from(payload.len())
        .map_err(|_| ProtocolError::PayloadTooLarge { size: payload.len(), max: MAX_PAYLOAD_SIZE })
}
