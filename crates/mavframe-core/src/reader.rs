//! Resynchronizing frame reader.
//!
//! MAVLink streams carry no framing beyond a marker byte, and marker values
//! are common inside payloads. The reader therefore treats every marker as a
//! candidate, reads exactly the length that candidate declares, and on any
//! failure rewinds to the candidate and moves on by a single byte. A valid
//! frame is never skipped because of a false marker in front of it.
//!
//! The returned frame is structurally valid only. Checksum and dialect checks
//! belong to the caller, which calls [`FrameReader::drop_frame`] to reject a
//! frame and resume scanning one byte past its marker.

use std::io::Read;

use mavframe_proto::{IncompatFlags, ProtocolVersion, RawFrame};

use crate::{buffer::TransactionalBuffer, error::ReadError};

/// Outcome of one parse attempt at the current position.
enum Attempt {
    Frame(RawFrame),
    Garbage,
    EndOfStream,
}

/// Pulls raw frames out of a byte stream, skipping anything that is not one.
///
/// Not thread-safe; callers serialize access.
#[derive(Debug)]
pub struct FrameReader<R> {
    buffer: TransactionalBuffer<R>,
    skipped_bytes: u64,
    frames_read: u64,
}

impl<R: Read> FrameReader<R> {
    /// Wrap a byte stream.
    pub fn new(inner: R) -> Self {
        Self { buffer: TransactionalBuffer::new(inner), skipped_bytes: 0, frames_read: 0 }
    }

    /// Read the next structurally valid frame.
    ///
    /// The frame's bytes stay uncommitted until the next call, so
    /// [`FrameReader::drop_frame`] can still reject it.
    ///
    /// # Errors
    ///
    /// - [`ReadError::EndOfStream`] when the stream ends where a marker was
    ///   expected
    /// - [`ReadError::Io`] when the stream fails; the attempt is rolled back
    ///   and a later call resumes at the same byte
    pub fn next(&mut self) -> Result<RawFrame, ReadError> {
        self.buffer.commit();

        loop {
            match self.attempt() {
                Ok(Attempt::Frame(frame)) => {
                    self.frames_read += 1;
                    return Ok(frame);
                },
                Ok(Attempt::Garbage) => self.drop_frame(),
                Ok(Attempt::EndOfStream) => return Err(ReadError::EndOfStream),
                Err(err) => {
                    self.buffer.rollback();
                    return Err(ReadError::Io(err));
                },
            }
        }
    }

    /// Discard the current candidate: rewind, skip its first byte, commit.
    pub fn drop_frame(&mut self) {
        self.buffer.rollback();
        let skipped = self.buffer.skip(1);
        self.buffer.commit();
        self.skipped_bytes += skipped as u64;

        tracing::trace!(position = self.buffer.position(), "skipped byte");
    }

    /// Bytes discarded while resynchronizing
    pub fn skipped_bytes(&self) -> u64 {
        self.skipped_bytes
    }

    /// Structurally valid frames returned so far
    pub fn frames_read(&self) -> u64 {
        self.frames_read
    }

    /// Absolute stream offset of the first uncommitted byte.
    ///
    /// Right after [`FrameReader::next`] returns, this is the offset of the
    /// returned frame's marker.
    pub fn position(&self) -> u64 {
        self.buffer.position()
    }

    fn attempt(&mut self) -> std::io::Result<Attempt> {
        let Some(marker) = self.buffer.read()? else {
            return Ok(Attempt::EndOfStream);
        };
        let Some(version) = ProtocolVersion::from_magic(marker) else {
            return Ok(Attempt::Garbage);
        };
        let Some(payload_length) = self.buffer.read()? else {
            return Ok(Attempt::Garbage);
        };

        let incompat_flags = match version {
            ProtocolVersion::V1 => IncompatFlags::empty(),
            ProtocolVersion::V2 => {
                let Some(byte) = self.buffer.read()? else {
                    return Ok(Attempt::Garbage);
                };
                let flags = IncompatFlags::from_byte(byte);
                if flags.has_unknown_bits() {
                    return Ok(Attempt::Garbage);
                }
                flags
            },
        };

        let total = RawFrame::wire_size(version, payload_length, incompat_flags);
        let remaining = total - self.buffer.tentative_bytes().len();
        if !self.buffer.advance(remaining)? {
            return Ok(Attempt::Garbage);
        }

        match RawFrame::decode(self.buffer.tentative_bytes()) {
            Ok(frame) => Ok(Attempt::Frame(frame)),
            Err(err) => {
                tracing::trace!(error = %err, "rejected frame candidate");
                Ok(Attempt::Garbage)
            },
        }
    }
}
