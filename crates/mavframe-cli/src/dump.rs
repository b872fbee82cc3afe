//! Frame listing.

use std::io::{Read, Write};

use anyhow::{Context, Result, bail};
use mavframe_core::{FrameReader, ReadError};
use mavframe_proto::{RawFrame, SecretKey};

/// Listing options
#[derive(Debug, Default)]
pub struct DumpOptions {
    /// Stop after this many frames
    pub limit: Option<u64>,
    /// Verify signatures of signed frames against this key
    pub key: Option<SecretKey>,
}

/// Totals after a dump
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DumpSummary {
    /// Frames listed
    pub frames: u64,
    /// Bytes skipped between frames
    pub skipped_bytes: u64,
}

/// Write one line per structurally valid frame found in `input`.
///
/// Checksums are not verified: without a dialect the seed is unknown, so
/// every well-formed candidate is listed.
pub fn dump<R: Read, W: Write>(input: R, out: &mut W, options: &DumpOptions) -> Result<DumpSummary> {
    let mut reader = FrameReader::new(input);
    let mut frames = 0;

    while options.limit.is_none_or(|limit| frames < limit) {
        let frame = match reader.next() {
            Ok(frame) => frame,
            Err(ReadError::EndOfStream) => break,
            Err(ReadError::Io(err)) => return Err(err).context("reading input"),
        };

        writeln!(out, "{}", line(reader.position(), &frame, options.key.as_ref()))?;
        frames += 1;
    }

    out.flush()?;
    Ok(DumpSummary { frames, skipped_bytes: reader.skipped_bytes() })
}

fn line(offset: u64, frame: &RawFrame, key: Option<&SecretKey>) -> String {
    let mut line = format!("{offset:>8}  {frame}");
    if let (Some(key), true) = (key, frame.is_signed()) {
        line.push_str(if frame.validate_signature(key) { " sig=ok" } else { " sig=bad" });
    }
    line.push_str("  ");
    line.push_str(&hex::encode(frame.payload()));
    line
}

/// Parse a 32-byte signing key from 64 hex digits.
pub fn parse_key(text: &str) -> Result<SecretKey> {
    let bytes = hex::decode(text.trim()).context("key is not valid hex")?;
    let Ok(key) = <[u8; 32]>::try_from(bytes.as_slice()) else {
        bail!("key must be 32 bytes, got {}", bytes.len());
    };
    Ok(SecretKey::new(key))
}

#[cfg(test)]
mod tests {
    use hex_literal::hex;

    use super::*;

    const V1_HEARTBEAT: [u8; 17] = hex!("fe09000101000000000002035104037ddd");
    const SIGNED_HEARTBEAT: [u8; 34] =
        hex!("fd090100010101000000000000000203510403106801bc9a78563412c217a0c1ec6d");

    fn run(input: &[u8], options: &DumpOptions) -> (String, DumpSummary) {
        let mut out = Vec::new();
        let summary = dump(input, &mut out, options).expect("in-memory dump");
        (String::from_utf8(out).expect("utf-8 output"), summary)
    }

    #[test]
    fn lists_frames_with_offsets() {
        let stream = [&[0x00, 0x11][..], &V1_HEARTBEAT[..]].concat();
        let (text, summary) = run(&stream, &DumpOptions::default());

        assert_eq!(text, "       2  v1 seq=0 sys=1 comp=1 msgid=0 len=9 crc=0xdd7d  000000000203510403\n");
        assert_eq!(summary, DumpSummary { frames: 1, skipped_bytes: 2 });
    }

    #[test]
    fn limit_stops_early() {
        let stream = [V1_HEARTBEAT; 3].concat();
        let (text, summary) = run(&stream, &DumpOptions { limit: Some(2), key: None });

        assert_eq!(text.lines().count(), 2);
        assert_eq!(summary.frames, 2);
    }

    #[test]
    fn reports_signature_status() {
        let good = DumpOptions { limit: None, key: Some(SecretKey::new([0x42; 32])) };
        let (text, _) = run(&SIGNED_HEARTBEAT, &good);
        assert!(text.contains("link=1 ts=20015998343868 sig=ok"));

        let bad = DumpOptions { limit: None, key: Some(SecretKey::new([0x43; 32])) };
        let (text, _) = run(&SIGNED_HEARTBEAT, &bad);
        assert!(text.contains("sig=bad"));
    }

    #[test]
    fn key_parsing() {
        let key = parse_key(&"42".repeat(32)).expect("valid key");
        assert_eq!(key.as_bytes(), &[0x42; 32]);
        assert!(parse_key("abcd").is_err());
        assert!(parse_key("zz").is_err());
    }
}
