//! Test harness for mavframe.
//!
//! Provides a small hand-written dialect, in-memory and faulty stream
//! fixtures, and seeded noise so that stream-level behavior can be tested
//! deterministically without serial ports or sockets.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod io;
pub mod logging;
pub mod messages;
pub mod noise;

pub use io::{ChunkedReader, FailingWriter, PipeReader, PipeWriter, ReadStep, ScriptedReader, SharedBuffer, pipe};
pub use logging::init_tracing;
pub use messages::{Heartbeat, MavState, Ping, ProtocolVersion, TestMessage, sample_heartbeat, test_dialect};
pub use noise::Noise;
