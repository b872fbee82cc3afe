//! Error types for reading frames and driving a connection.

use std::io;

use mavframe_proto::ProtocolError;
use thiserror::Error;

/// Errors returned by [`crate::FrameReader::next`].
///
/// Garbled input never surfaces here: the reader resynchronizes on its own.
#[derive(Error, Debug)]
pub enum ReadError {
    /// The stream ended before another frame marker was found
    #[error("end of stream")]
    EndOfStream,

    /// The underlying reader failed; buffered bytes were rolled back
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Errors returned by [`crate::Connection`].
#[derive(Error, Debug)]
pub enum ConnectionError {
    /// No input or output installed; call `connect` first
    #[error("connection not connected")]
    NotConnected,

    /// Input stream ended
    #[error("end of stream")]
    EndOfStream,

    /// Read, write or flush failed
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Outgoing frame could not be built
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

impl From<ReadError> for ConnectionError {
    fn from(err: ReadError) -> Self {
        match err {
            ReadError::EndOfStream => Self::EndOfStream,
            ReadError::Io(err) => Self::Io(err),
        }
    }
}
