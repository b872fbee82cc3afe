//! Resynchronization fuzzer for the frame reader
//!
//! Inserts a valid frame after arbitrary garbage and checks that the reader
//! still finds it, however the garbage is shaped.

#![no_main]

use libfuzzer_sys::fuzz_target;
use mavframe_core::FrameReader;
use mavframe_proto::{MavHeader, RawFrame};

const CRC_EXTRA: u8 = 237;

fuzz_target!(|data: &[u8]| {
    let Some((&sequence, garbage)) = data.split_first() else {
        return;
    };

    let header = MavHeader { sequence, system_id: 1, component_id: 1 };
    let Ok(frame) = RawFrame::encode_unsigned_v2(header, 4, &[sequence, 0xFD, 0xFE], CRC_EXTRA) else {
        return;
    };

    let stream = [garbage, &frame.raw_bytes()[..]].concat();
    let mut reader = FrameReader::new(stream.as_slice());
    let mut found = false;

    while let Ok(raw) = reader.next() {
        if raw == frame {
            found = true;
        } else {
            reader.drop_frame();
        }
    }

    assert!(found, "frame lost after {} garbage bytes", garbage.len());
});
