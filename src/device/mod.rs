//! Device link: how command frames reach the actuator.
//!
//! ## Architecture
//!
//! ```text
//!  gateway / scheduler
//!          |
//!          v  CommandFrame
//!    DeviceChannel (trait)
//!     |             |
//!     v             v
//!  SerialChannel  SimChannel
//!  (hardware)     (fallback + tests)
//! ```
//!
//! ## Rules
//!
//! - One frame per write; implementations serialize concurrent writers so
//!   frames never interleave on the wire.
//! - A read timeout is an empty line, not an error. The firmware only
//!   answers when it has something to say.
//! - Opening the link happens once at startup. If the hardware port cannot
//!   be opened, [`connect`] falls back to the simulated channel so the rest
//!   of the system keeps running.

mod serial;
mod sim;

pub use serial::SerialChannel;
pub use sim::SimChannel;

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::error::TransportError;
use crate::frame::CommandFrame;

/// # Byte-level link to the actuator.
///
/// Implementations must be safe to share behind an `Arc` and must serialize
/// writes internally; callers hold no lock of their own.
pub trait DeviceChannel: Send + Sync {
    /// Writes `bytes` as a single unit and flushes.
    fn write_all(&self, bytes: &[u8]) -> Result<(), TransportError>;

    /// Reads one newline-terminated line, with the terminator and any
    /// trailing carriage return stripped.
    ///
    /// Returns an empty string when the device stayed silent for the
    /// configured timeout.
    fn read_line(&self) -> Result<String, TransportError>;

    /// Encodes and writes one command frame.
    fn send(&self, frame: &CommandFrame) -> Result<(), TransportError> {
        self.write_all(frame.encode().as_bytes())
    }
}

/// Opens the hardware port, or falls back to the simulated channel.
///
/// The fallback keeps every other part of the system operational on
/// machines without the actuator attached; frames are logged instead of
/// written to a wire.
pub fn connect(path: &str, baud: u32, timeout: Duration) -> Arc<dyn DeviceChannel> {
    match SerialChannel::open(path, baud, timeout) {
        Ok(channel) => {
            info!(port = path, baud, "serial device connected");
            Arc::new(channel)
        }
        Err(err) => {
            warn!(
                port = path,
                error = %err,
                "serial open failed; continuing with simulated device"
            );
            Arc::new(SimChannel::new())
        }
    }
}
