//! MAVLink stream reading and connection logic.
//!
//! Builds on the wire format in `mavframe-proto` to pull frames out of
//! untrusted byte streams and exchange typed messages over them.
//!
//! # Architecture
//!
//! Input is read through a transactional buffer: every parse attempt can be
//! rolled back, so a false frame marker costs one byte of scanning rather than
//! a lost frame. The frame reader only checks structure. The connection layers
//! the dialect, checksum and signature checks on top and sends frames with a
//! per-connection wrapping sequence number.
//!
//! All I/O is blocking `std::io`. Callers that need deadlines set them on the
//! underlying stream; a timed-out read surfaces as an I/O error and leaves the
//! reader consistent.
//!
//! # Components
//!
//! - [`buffer`]: Commit/rollback read buffer
//! - [`reader`]: Resynchronizing frame reader
//! - [`dialect`]: Message-id registry
//! - [`frame`]: Decoded frame
//! - [`connection`]: Thread-safe connection, configuration and counters
//! - [`error`]: Read and connection error types

pub mod buffer;
pub mod connection;
pub mod dialect;
pub mod error;
pub mod frame;
pub mod reader;

pub use buffer::TransactionalBuffer;
pub use connection::{Connection, ConnectionConfig, ConnectionStats, SignatureVerification};
pub use dialect::{DecodeFn, Dialect, DialectBuilder, MessageMetadata};
pub use error::{ConnectionError, ReadError};
pub use frame::Frame;
pub use reader::FrameReader;
