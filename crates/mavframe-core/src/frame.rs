//! Decoded frame: the raw wire frame together with its typed message.

use mavframe_proto::{MavHeader, ProtocolVersion, RawFrame};

/// A frame that passed checksum and dialect checks, tagged by version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame<M> {
    /// Received as MAVLink 1
    V1 {
        /// Frame as received
        raw: RawFrame,
        /// Decoded payload
        message: M,
    },
    /// Received as MAVLink 2, signed or not
    V2 {
        /// Frame as received
        raw: RawFrame,
        /// Decoded payload
        message: M,
    },
}

impl<M> Frame<M> {
    pub(crate) fn new(raw: RawFrame, message: M) -> Self {
        match raw.version() {
            ProtocolVersion::V1 => Self::V1 { raw, message },
            ProtocolVersion::V2 => Self::V2 { raw, message },
        }
    }

    /// Frame as received
    pub fn raw(&self) -> &RawFrame {
        match self {
            Self::V1 { raw, .. } | Self::V2 { raw, .. } => raw,
        }
    }

    /// Decoded message
    pub fn message(&self) -> &M {
        match self {
            Self::V1 { message, .. } | Self::V2 { message, .. } => message,
        }
    }

    /// Take the decoded message
    pub fn into_message(self) -> M {
        match self {
            Self::V1 { message, .. } | Self::V2 { message, .. } => message,
        }
    }

    /// Protocol version the frame arrived with
    pub fn version(&self) -> ProtocolVersion {
        self.raw().version()
    }

    /// Sender ids and sequence number
    pub fn header(&self) -> MavHeader {
        self.raw().header()
    }
}
