//! MAVLink v2 frame signing.
//!
//! A signed frame carries a 13-byte block after its checksum:
//!
//! ```text
//! ┌─────────┬──────────────────────┬──────────────────┐
//! │ link_id │ timestamp (48-bit LE)│ hash (6 bytes)   │
//! │ 1 byte  │ 6 bytes              │ 6 bytes          │
//! └─────────┴──────────────────────┴──────────────────┘
//! ```
//!
//! The hash is the first 48 bits of
//! `SHA-256(secret_key ‖ marker ‖ header ‖ payload ‖ checksum ‖ link_id ‖ timestamp)`.
//! Timestamps count 10µs ticks since 2015-01-01 and must increase per link;
//! replay tracking is left to the caller.

use std::fmt;

use sha2::{Digest, Sha256};

use crate::errors::{ProtocolError, Result};

/// Size of the signature block appended to signed v2 frames
pub const SIGNATURE_SIZE: usize = 13;

/// Size of the truncated hash inside the signature block
pub const SIGNATURE_HASH_SIZE: usize = 6;

/// Largest timestamp representable in the 48-bit field
pub const MAX_TIMESTAMP: u64 = (1 << 48) - 1;

/// Shared 32-byte signing secret.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretKey([u8; 32]);

impl SecretKey {
    /// Wrap raw key bytes
    #[must_use]
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Raw key bytes
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl From<[u8; 32]> for SecretKey {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(<redacted>)")
    }
}

/// Inputs needed to sign an outgoing frame.
#[derive(Debug, Clone, Copy)]
pub struct SigningParams<'a> {
    /// Link the frame is sent on
    pub link_id: u8,
    /// 48-bit signing timestamp
    pub timestamp: u64,
    /// Shared secret
    pub secret_key: &'a SecretKey,
}

/// Signature block of a signed v2 frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature {
    /// Link the frame was sent on
    pub link_id: u8,
    /// 48-bit signing timestamp
    pub timestamp: u64,
    /// Truncated SHA-256 hash
    pub hash: [u8; SIGNATURE_HASH_SIZE],
}

impl Signature {
    /// Sign `frame`, the wire bytes from the marker through the checksum.
    pub fn sign(frame: &[u8], params: &SigningParams<'_>) -> Result<Self> {
        if params.timestamp > MAX_TIMESTAMP {
            return Err(ProtocolError::TimestampOutOfRange(params.timestamp));
        }

        let hash = compute_hash(frame, params.link_id, params.timestamp, params.secret_key);
        Ok(Self { link_id: params.link_id, timestamp: params.timestamp, hash })
    }

    /// Parse a 13-byte signature block.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let block: &[u8; SIGNATURE_SIZE] = bytes
            .get(..SIGNATURE_SIZE)
            .and_then(|b| b.try_into().ok())
            .ok_or(ProtocolError::FrameTooShort { expected: SIGNATURE_SIZE, actual: bytes.len() })?;

        let mut timestamp = [0u8; 8];
        timestamp[..6].copy_from_slice(&block[1..7]);

        let mut hash = [0u8; SIGNATURE_HASH_SIZE];
        hash.copy_from_slice(&block[7..]);

        Ok(Self { link_id: block[0], timestamp: u64::from_le_bytes(timestamp), hash })
    }

    /// Serialize to the 13-byte wire block
    #[must_use]
    pub fn to_bytes(&self) -> [u8; SIGNATURE_SIZE] {
        let mut block = [0u8; SIGNATURE_SIZE];
        block[0] = self.link_id;
        block[1..7].copy_from_slice(&self.timestamp.to_le_bytes()[..6]);
        block[7..].copy_from_slice(&self.hash);
        block
    }

    /// Check the hash against `frame` (marker through checksum) and `key`.
    #[must_use]
    pub fn verify(&self, frame: &[u8], key: &SecretKey) -> bool {
        compute_hash(frame, self.link_id, self.timestamp, key) == self.hash
    }
}

fn compute_hash(
    frame: &[u8],
    link_id: u8,
    timestamp: u64,
    key: &SecretKey,
) -> [u8; SIGNATURE_HASH_SIZE] {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    hasher.update(frame);
    hasher.update([link_id]);
    hasher.update(&timestamp.to_le_bytes()[..6]);

    let digest = hasher.finalize();
    let mut hash = [0u8; SIGNATURE_HASH_SIZE];
    hash.copy_from_slice(&digest[..SIGNATURE_HASH_SIZE]);
    hash
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: &[u8] = &[0xFD, 0x01, 0x01, 0x00, 0x00, 0x01, 0x01, 0x00, 0x00, 0x00, 0x07];

    #[test]
    fn block_round_trip() {
        let key = SecretKey::new([7; 32]);
        let params = SigningParams { link_id: 3, timestamp: 0x0000_1234_5678_9ABC, secret_key: &key };
        let signature = Signature::sign(FRAME, &params).expect("timestamp fits");

        let parsed = Signature::from_bytes(&signature.to_bytes()).expect("13 bytes");
        assert_eq!(parsed, signature);
    }

    #[test]
    fn verify_rejects_other_key() {
        let key = SecretKey::new([1; 32]);
        let other = SecretKey::new([2; 32]);
        let params = SigningParams { link_id: 0, timestamp: 1, secret_key: &key };
        let signature = Signature::sign(FRAME, &params).expect("timestamp fits");

        assert!(signature.verify(FRAME, &key));
        assert!(!signature.verify(FRAME, &other));
    }

    #[test]
    fn reject_oversized_timestamp() {
        let key = SecretKey::new([0; 32]);
        let params = SigningParams { link_id: 0, timestamp: MAX_TIMESTAMP + 1, secret_key: &key };
        assert_eq!(
            Signature::sign(FRAME, &params),
            Err(ProtocolError::TimestampOutOfRange(MAX_TIMESTAMP + 1))
        );
    }

    #[test]
    fn reject_short_block() {
        assert!(matches!(Signature::from_bytes(&[0; 12]), Err(ProtocolError::FrameTooShort { .. })));
    }

    #[test]
    fn key_debug_is_redacted() {
        let key = SecretKey::new([0xAA; 32]);
        assert_eq!(format!("{key:?}"), "SecretKey(<redacted>)");
    }
}
