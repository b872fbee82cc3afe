//! Random-input fuzzer for raw frame decoding
//!
//! Any byte string must either fail with a structured error or decode to a
//! frame whose fields agree with its own wire bytes.

#![no_main]

use libfuzzer_sys::fuzz_target;
use mavframe_proto::{RawFrame, SecretKey};

fuzz_target!(|data: &[u8]| {
    let Ok(frame) = RawFrame::decode(data) else {
        return;
    };

    let wire = frame.raw_bytes();
    assert!(data.starts_with(wire));
    assert_eq!(usize::from(frame.payload_length()), frame.payload().len());
    assert_eq!(
        RawFrame::wire_size(frame.version(), frame.payload_length(), frame.incompat_flags()),
        wire.len()
    );

    // Re-decoding the exact frame bytes is stable.
    let again = RawFrame::decode(wire);
    assert_eq!(again.as_ref(), Ok(&frame));

    // Validation never panics.
    let _ = frame.validate_crc(data[0]);
    let _ = frame.validate_signature(&SecretKey::new([0; 32]));
});
