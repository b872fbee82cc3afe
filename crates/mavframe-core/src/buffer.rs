//! Transactional read buffer over a blocking byte stream.
//!
//! Frame parsing is speculative: the reader consumes bytes, and only after a
//! full frame parses does it know whether those bytes were a frame or noise.
//! This buffer keeps every byte since the last commit so a failed attempt can
//! rewind and retry one byte later.
//!
//! ```text
//!   retained: ┌──────────────────────┬───────────────────┐
//!             │ consumed (tentative) │ buffered, unread  │
//!             └──────────────────────┴───────────────────┘
//!             ^ committed            ^ tentative         ^ end
//! ```
//!
//! # Invariants
//!
//! - `committed <= tentative <= end`
//! - Bytes before `committed` are gone and never re-read.
//! - An I/O error never discards buffered bytes.

use std::io::{self, Read};

use bytes::{Buf, BytesMut};

/// Bytes requested from the inner reader per fill: one maximal signed v2 frame.
pub const READ_CHUNK_SIZE: usize = mavframe_proto::MAX_FRAME_SIZE;

/// Buffered reader with commit and rollback over its read position.
#[derive(Debug)]
pub struct TransactionalBuffer<R> {
    inner: R,
    /// Bytes from the committed position to the end of buffered input
    buf: BytesMut,
    /// Read position of the current attempt, as an offset into `buf`
    tentative: usize,
    /// Absolute stream offset of `buf[0]`
    position: u64,
}

impl<R: Read> TransactionalBuffer<R> {
    /// Wrap a reader.
    pub fn new(inner: R) -> Self {
        Self { inner, buf: BytesMut::with_capacity(READ_CHUNK_SIZE * 2), tentative: 0, position: 0 }
    }

    /// Consume one byte, or `None` at end of stream.
    ///
    /// `Interrupted` reads are retried. On any other error the tentative
    /// position is unchanged.
    pub fn read(&mut self) -> io::Result<Option<u8>> {
        if self.tentative == self.buf.len() && self.fill()? == 0 {
            return Ok(None);
        }

        let byte = self.buf[self.tentative];
        self.tentative += 1;
        Ok(Some(byte))
    }

    /// Consume `n` bytes.
    ///
    /// Returns `false` without moving if the stream ends first. Bytes read
    /// while trying stay buffered.
    pub fn advance(&mut self, n: usize) -> io::Result<bool> {
        while self.buf.len() - self.tentative < n {
            if self.fill()? == 0 {
                return Ok(false);
            }
        }

        self.tentative += n;
        Ok(true)
    }

    /// Discard everything before the tentative position.
    pub fn commit(&mut self) {
        self.buf.advance(self.tentative);
        self.position += self.tentative as u64;
        self.tentative = 0;
    }

    /// Rewind the tentative position to the last commit.
    pub fn rollback(&mut self) {
        self.tentative = 0;
    }

    /// Consume up to `n` bytes that are already buffered, without reading.
    ///
    /// Returns the number of bytes skipped.
    pub fn skip(&mut self, n: usize) -> usize {
        let skipped = n.min(self.buf.len() - self.tentative);
        self.tentative += skipped;
        skipped
    }

    /// Bytes consumed since the last commit
    pub fn tentative_bytes(&self) -> &[u8] {
        &self.buf[..self.tentative]
    }

    /// Absolute stream offset of the committed position
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Bytes buffered past the tentative position
    pub fn buffered(&self) -> usize {
        self.buf.len() - self.tentative
    }

    /// Append up to one chunk from the inner reader. Returns 0 at end of stream.
    fn fill(&mut self) -> io::Result<usize> {
        let start = self.buf.len();
        self.buf.resize(start + READ_CHUNK_SIZE, 0);

        loop {
            match self.inner.read(&mut self.buf[start..]) {
                Ok(n) => {
                    self.buf.truncate(start + n);
                    return Ok(n);
                },
                Err(err) if err.kind() == io::ErrorKind::Interrupted => {},
                Err(err) => {
                    self.buf.truncate(start);
                    return Err(err);
                },
            }
        }
    }
}
