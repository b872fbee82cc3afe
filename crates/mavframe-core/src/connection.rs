//! Thread-safe MAVLink connection over blocking byte streams.
//!
//! The connection owns a [`FrameReader`] over its input and a sink for its
//! output, and turns raw frames into typed messages through a [`Dialect`].
//!
//! # Concurrency
//!
//! Reading and writing are guarded by independent locks, so one thread can
//! block in [`Connection::next`] while others send. Within each direction,
//! calls are mutually exclusive:
//!
//! - Receivers see frames in arrival order.
//! - Each outgoing frame is built and written under the write lock, so frames
//!   never interleave on the wire and sequence numbers follow lock order.
//!
//! [`Connection::connect`] takes the read lock, then the write lock. It waits
//! for any blocked `next` to return.
//!
//! # Receive pipeline
//!
//! ```text
//! FrameReader ─> dialect lookup ─> checksum ─> signature policy ─> decode ─> Frame
//!                     │                │              │               │
//!                     └────────────────┴──────────────┴───────────────┴─> drop_frame, retry
//! ```
//!
//! Rejected frames are counted in [`ConnectionStats`] and scanning resumes one
//! byte past the rejected marker.

use std::{
    io::{Read, Write},
    sync::atomic::{AtomicU64, Ordering},
};

use mavframe_proto::{MavHeader, MavMessage, RawFrame, SecretKey, SigningParams};
use parking_lot::Mutex;

use crate::{dialect::Dialect, error::ConnectionError, frame::Frame, reader::FrameReader};

type Input = Box<dyn Read + Send>;
type Output = Box<dyn Write + Send>;

/// Incoming signature policy.
#[derive(Debug, Clone)]
pub struct SignatureVerification {
    /// Key signed frames must verify against
    pub secret_key: SecretKey,
    /// Accept unsigned frames (including all v1 frames)
    pub accept_unsigned: bool,
}

impl SignatureVerification {
    fn accepts(&self, frame: &RawFrame) -> bool {
        if frame.is_signed() { frame.validate_signature(&self.secret_key) } else { self.accept_unsigned }
    }
}

/// Connection configuration
#[derive(Debug, Clone, Default)]
pub struct ConnectionConfig {
    /// Signature policy for incoming frames; `None` accepts every frame whose
    /// checksum is valid
    pub signature_verification: Option<SignatureVerification>,
}

impl ConnectionConfig {
    fn accepts(&self, frame: &RawFrame) -> bool {
        self.signature_verification.as_ref().is_none_or(|policy| policy.accepts(frame))
    }
}

/// Snapshot of connection counters since the last `connect`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConnectionStats {
    /// Frames decoded and returned by `next`
    pub frames_received: u64,
    /// Frames dropped because the dialect has no such id
    pub unknown_messages: u64,
    /// Frames dropped on checksum mismatch
    pub checksum_errors: u64,
    /// Frames dropped by the signature policy
    pub signature_errors: u64,
    /// Frames dropped because the payload did not decode
    pub decode_errors: u64,
    /// Bytes discarded while resynchronizing
    pub bytes_skipped: u64,
    /// Frames written by the send methods
    pub frames_sent: u64,
}

/// Live counters behind [`ConnectionStats`]. Readable without either lock.
#[derive(Debug, Default)]
struct Counters {
    frames_received: AtomicU64,
    unknown_messages: AtomicU64,
    checksum_errors: AtomicU64,
    signature_errors: AtomicU64,
    decode_errors: AtomicU64,
    bytes_skipped: AtomicU64,
    frames_sent: AtomicU64,
}

impl Counters {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn reset(&self) {
        for counter in self.all() {
            counter.store(0, Ordering::Relaxed);
        }
    }

    fn all(&self) -> [&AtomicU64; 7] {
        [
            &self.frames_received,
            &self.unknown_messages,
            &self.checksum_errors,
            &self.signature_errors,
            &self.decode_errors,
            &self.bytes_skipped,
            &self.frames_sent,
        ]
    }

    fn snapshot(&self) -> ConnectionStats {
        ConnectionStats {
            frames_received: self.frames_received.load(Ordering::Relaxed),
            unknown_messages: self.unknown_messages.load(Ordering::Relaxed),
            checksum_errors: self.checksum_errors.load(Ordering::Relaxed),
            signature_errors: self.signature_errors.load(Ordering::Relaxed),
            decode_errors: self.decode_errors.load(Ordering::Relaxed),
            bytes_skipped: self.bytes_skipped.load(Ordering::Relaxed),
            frames_sent: self.frames_sent.load(Ordering::Relaxed),
        }
    }
}

/// Write side state
struct WriteHalf {
    sink: Option<Output>,
    sequence: u8,
}

/// Frame flavor for an outgoing message.
#[derive(Clone, Copy)]
enum Encoding<'a> {
    V1,
    UnsignedV2,
    SignedV2(&'a SigningParams<'a>),
}

/// MAVLink connection parameterized by its dialect's message type.
pub struct Connection<M> {
    dialect: Dialect<M>,
    config: ConnectionConfig,
    read: Mutex<Option<FrameReader<Input>>>,
    write: Mutex<WriteHalf>,
    counters: Counters,
}

impl<M> Connection<M> {
    /// Create an unconnected connection.
    pub fn new(dialect: Dialect<M>, config: ConnectionConfig) -> Self {
        Self {
            dialect,
            config,
            read: Mutex::new(None),
            write: Mutex::new(WriteHalf { sink: None, sequence: 0 }),
            counters: Counters::default(),
        }
    }

    /// Install new input and output streams.
    ///
    /// Replaces any previous streams, resets the outgoing sequence to 0 and
    /// clears the counters. Buffered input from the old stream is discarded.
    pub fn connect<R, W>(&self, input: R, output: W)
    where
        R: Read + Send + 'static,
        W: Write + Send + 'static,
    {
        let mut read = self.read.lock();
        let mut write = self.write.lock();

        *read = Some(FrameReader::new(Box::new(input)));
        write.sink = Some(Box::new(output));
        write.sequence = 0;
        self.counters.reset();

        tracing::debug!(messages = self.dialect.len(), "connected");
    }

    /// Block until the next valid frame arrives.
    ///
    /// Frames with an unknown id, a bad checksum, a rejected signature or an
    /// undecodable payload are dropped and counted; reading continues.
    ///
    /// # Errors
    ///
    /// - [`ConnectionError::NotConnected`] before the first `connect`
    /// - [`ConnectionError::EndOfStream`] when the input ends
    /// - [`ConnectionError::Io`] when the input fails; a later call resumes
    ///   without losing buffered bytes
    pub fn next(&self) -> Result<Frame<M>, ConnectionError> {
        let mut read = self.read.lock();
        let reader = read.as_mut().ok_or(ConnectionError::NotConnected)?;

        loop {
            let result = reader.next();
            self.counters.bytes_skipped.store(reader.skipped_bytes(), Ordering::Relaxed);

            if let Some(frame) = self.accept(result?) {
                return Ok(frame);
            }
            reader.drop_frame();
        }
    }

    /// Send `message` as a MAVLink 1 frame.
    ///
    /// # Errors
    ///
    /// - [`ConnectionError::NotConnected`] before the first `connect`
    /// - [`ConnectionError::Protocol`] if the message id exceeds 8 bits or
    ///   the payload exceeds 255 bytes; no sequence number is consumed
    /// - [`ConnectionError::Io`] if writing or flushing fails
    pub fn send_v1<T: MavMessage>(
        &self,
        system_id: u8,
        component_id: u8,
        message: &T,
    ) -> Result<(), ConnectionError> {
        self.send(system_id, component_id, message, Encoding::V1)
    }

    /// Send `message` as an unsigned MAVLink 2 frame.
    ///
    /// # Errors
    ///
    /// As [`Connection::send_v1`], with a 24-bit id limit.
    pub fn send_unsigned_v2<T: MavMessage>(
        &self,
        system_id: u8,
        component_id: u8,
        message: &T,
    ) -> Result<(), ConnectionError> {
        self.send(system_id, component_id, message, Encoding::UnsignedV2)
    }

    /// Send `message` as a signed MAVLink 2 frame.
    ///
    /// # Errors
    ///
    /// As [`Connection::send_unsigned_v2`], plus
    /// [`ConnectionError::Protocol`] if the timestamp exceeds 48 bits.
    pub fn send_signed_v2<T: MavMessage>(
        &self,
        system_id: u8,
        component_id: u8,
        message: &T,
        signing: &SigningParams<'_>,
    ) -> Result<(), ConnectionError> {
        self.send(system_id, component_id, message, Encoding::SignedV2(signing))
    }

    /// Counters since the last `connect`
    pub fn stats(&self) -> ConnectionStats {
        self.counters.snapshot()
    }

    /// Dialect used to decode incoming frames
    pub fn dialect(&self) -> &Dialect<M> {
        &self.dialect
    }

    /// Run a raw frame through the receive checks. `None` means drop it.
    fn accept(&self, raw: RawFrame) -> Option<Frame<M>> {
        let message_id = raw.message_id();

        let Some(meta) = self.dialect.resolve(message_id) else {
            tracing::trace!(message_id, "unknown message id");
            Counters::bump(&self.counters.unknown_messages);
            return None;
        };

        if !raw.validate_crc(meta.crc_extra) {
            tracing::debug!(message_id, checksum = raw.checksum(), "checksum mismatch");
            Counters::bump(&self.counters.checksum_errors);
            return None;
        }

        if !self.config.accepts(&raw) {
            tracing::debug!(message_id, signed = raw.is_signed(), "signature rejected");
            Counters::bump(&self.counters.signature_errors);
            return None;
        }

        match meta.decode_payload(&raw) {
            Ok(message) => {
                Counters::bump(&self.counters.frames_received);
                Some(Frame::new(raw, message))
            },
            Err(err) => {
                tracing::warn!(
                    message_id,
                    system_id = raw.system_id(),
                    component_id = raw.component_id(),
                    error = %err,
                    "failed to decode payload"
                );
                Counters::bump(&self.counters.decode_errors);
                None
            },
        }
    }

    fn send<T: MavMessage>(
        &self,
        system_id: u8,
        component_id: u8,
        message: &T,
        encoding: Encoding<'_>,
    ) -> Result<(), ConnectionError> {
        let mut write = self.write.lock();
        let WriteHalf { sink, sequence } = &mut *write;
        let sink = sink.as_mut().ok_or(ConnectionError::NotConnected)?;

        let header = MavHeader { sequence: *sequence, system_id, component_id };
        let payload = message.encode();
        let frame = match encoding {
            Encoding::V1 => RawFrame::encode_v1(header, T::ID, &payload, T::CRC_EXTRA),
            Encoding::UnsignedV2 => RawFrame::encode_unsigned_v2(header, T::ID, &payload, T::CRC_EXTRA),
            Encoding::SignedV2(signing) => {
                RawFrame::encode_signed_v2(header, T::ID, &payload, T::CRC_EXTRA, signing)
            },
        }?;
        *sequence = sequence.wrapping_add(1);

        sink.write_all(frame.raw_bytes())?;
        sink.flush()?;
        Counters::bump(&self.counters.frames_sent);

        tracing::debug!(
            message_id = T::ID,
            sequence = frame.sequence(),
            version = %frame.version(),
            signed = frame.is_signed(),
            "sent frame"
        );
        Ok(())
    }
}
