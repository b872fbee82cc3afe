//! Hand-written test dialect: HEARTBEAT, PING and PROTOCOL_VERSION.
//!
//! Field order, ids, checksum seeds and sizes match the common MAVLink
//! definitions, so frames built here interoperate with real peers.

use bytes::{Buf, BufMut};
use mavframe_core::Dialect;
use mavframe_proto::{DecodeError, MavMessage};

/// Vehicle state reported in HEARTBEAT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MavState {
    /// Uninitialized, state unknown
    Uninit = 0,
    /// Booting up
    Boot = 1,
    /// Calibrating, not flight-ready
    Calibrating = 2,
    /// Grounded and on standby
    Standby = 3,
    /// Active, motors may be engaged
    Active = 4,
    /// Non-normal flight mode, can still navigate
    Critical = 5,
    /// Lost control, mayday
    Emergency = 6,
    /// Shutting down
    Poweroff = 7,
    /// Terminating flight
    FlightTermination = 8,
}

impl TryFrom<u8> for MavState {
    type Error = DecodeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => Self::Uninit,
            1 => Self::Boot,
            2 => Self::Calibrating,
            3 => Self::Standby,
            4 => Self::Active,
            5 => Self::Critical,
            6 => Self::Emergency,
            7 => Self::Poweroff,
            8 => Self::FlightTermination,
            other => {
                return Err(DecodeError::InvalidValue { field: "system_status", value: other.into() });
            },
        })
    }
}

/// HEARTBEAT (#0)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Heartbeat {
    /// Autopilot-specific mode bits
    pub custom_mode: u32,
    /// Vehicle type
    pub mav_type: u8,
    /// Autopilot type
    pub autopilot: u8,
    /// System mode bitmap
    pub base_mode: u8,
    /// System status
    pub system_status: MavState,
    /// MAVLink version of the sender
    pub mavlink_version: u8,
}

impl MavMessage for Heartbeat {
    const ID: u32 = 0;
    const CRC_EXTRA: u8 = 50;
    const ENCODED_LEN: usize = 9;

    fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(Self::ENCODED_LEN);
        out.put_u32_le(self.custom_mode);
        out.put_u8(self.mav_type);
        out.put_u8(self.autopilot);
        out.put_u8(self.base_mode);
        out.put_u8(self.system_status as u8);
        out.put_u8(self.mavlink_version);
        out
    }

    fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        DecodeError::ensure_len(payload, Self::ENCODED_LEN)?;
        let mut buf = payload;
        Ok(Self {
            custom_mode: buf.get_u32_le(),
            mav_type: buf.get_u8(),
            autopilot: buf.get_u8(),
            base_mode: buf.get_u8(),
            system_status: MavState::try_from(buf.get_u8())?,
            mavlink_version: buf.get_u8(),
        })
    }
}

/// PING (#4)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ping {
    /// Timestamp in microseconds
    pub time_usec: u64,
    /// Ping sequence
    pub seq: u32,
    /// 0 for a request, otherwise the requesting system
    pub target_system: u8,
    /// 0 for a request, otherwise the requesting component
    pub target_component: u8,
}

impl MavMessage for Ping {
    const ID: u32 = 4;
    const CRC_EXTRA: u8 = 237;
    const ENCODED_LEN: usize = 14;

    fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(Self::ENCODED_LEN);
        out.put_u64_le(self.time_usec);
        out.put_u32_le(self.seq);
        out.put_u8(self.target_system);
        out.put_u8(self.target_component);
        out
    }

    fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        DecodeError::ensure_len(payload, Self::ENCODED_LEN)?;
        let mut buf = payload;
        Ok(Self {
            time_usec: buf.get_u64_le(),
            seq: buf.get_u32_le(),
            target_system: buf.get_u8(),
            target_component: buf.get_u8(),
        })
    }
}

/// PROTOCOL_VERSION (#300), only representable in v2 frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtocolVersion {
    /// Currently active version times 100
    pub version: u16,
    /// Minimum supported version times 100
    pub min_version: u16,
    /// Maximum supported version times 100
    pub max_version: u16,
    /// First 8 bytes of the definitions git hash
    pub spec_version_hash: [u8; 8],
    /// First 8 bytes of the library git hash
    pub library_version_hash: [u8; 8],
}

impl MavMessage for ProtocolVersion {
    const ID: u32 = 300;
    const CRC_EXTRA: u8 = 217;
    const ENCODED_LEN: usize = 22;

    fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(Self::ENCODED_LEN);
        out.put_u16_le(self.version);
        out.put_u16_le(self.min_version);
        out.put_u16_le(self.max_version);
        out.put_slice(&self.spec_version_hash);
        out.put_slice(&self.library_version_hash);
        out
    }

    fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        DecodeError::ensure_len(payload, Self::ENCODED_LEN)?;
        let mut buf = payload;
        let version = buf.get_u16_le();
        let min_version = buf.get_u16_le();
        let max_version = buf.get_u16_le();
        let mut spec_version_hash = [0; 8];
        buf.copy_to_slice(&mut spec_version_hash);
        let mut library_version_hash = [0; 8];
        buf.copy_to_slice(&mut library_version_hash);
        Ok(Self { version, min_version, max_version, spec_version_hash, library_version_hash })
    }
}

/// Every message of the test dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestMessage {
    /// HEARTBEAT
    Heartbeat(Heartbeat),
    /// PING
    Ping(Ping),
    /// PROTOCOL_VERSION
    ProtocolVersion(ProtocolVersion),
}

impl From<Heartbeat> for TestMessage {
    fn from(value: Heartbeat) -> Self {
        Self::Heartbeat(value)
    }
}

impl From<Ping> for TestMessage {
    fn from(value: Ping) -> Self {
        Self::Ping(value)
    }
}

impl From<ProtocolVersion> for TestMessage {
    fn from(value: ProtocolVersion) -> Self {
        Self::ProtocolVersion(value)
    }
}

/// Dialect containing HEARTBEAT, PING and PROTOCOL_VERSION.
pub fn test_dialect() -> Dialect<TestMessage> {
    Dialect::builder().message::<Heartbeat>().message::<Ping>().message::<ProtocolVersion>().build()
}

/// Typical quadrotor heartbeat: ArduPilot, armed, active.
pub fn sample_heartbeat() -> Heartbeat {
    Heartbeat {
        custom_mode: 0,
        mav_type: 2,
        autopilot: 3,
        base_mode: 81,
        system_status: MavState::Active,
        mavlink_version: 3,
    }
}
