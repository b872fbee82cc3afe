//! CRC-16/MCRF4XX frame checksum.
//!
//! The checksum covers every header byte after the marker, the payload, and
//! finally the per-message `crc_extra` seed. The seed never travels on the
//! wire: it comes from the receiver's dialect, so a sender and receiver that
//! disagree on a message's field layout also disagree on its checksum.

use crc_any::CRCu16;

/// Compute the frame checksum over `data` followed by `crc_extra`.
pub fn calculate_crc(data: &[u8], crc_extra: u8) -> u16 {
    let mut crc = CRCu16::crc16mcrf4cc();
    crc.digest(data);
    crc.digest(&[crc_extra]);
    crc.get_crc()
}
