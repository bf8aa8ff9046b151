//! Simulated device transport.
//!
//! Stands in for the actuator in two situations:
//!
//! - at startup, when the hardware port cannot be opened (frames are logged
//!   instead of written, so operators can still see what *would* happen);
//! - in tests, where written frames are inspected and failures injected.

use std::collections::VecDeque;
use std::io;
use std::sync::Mutex;

use tracing::info;

use crate::error::TransportError;

use super::DeviceChannel;

#[derive(Debug, Default)]
struct SimState {
    written: Vec<String>,
    replies: VecDeque<String>,
    fail_prefixes: Vec<String>,
}

/// # In-memory stand-in for the serial link.
///
/// Records every frame written to it, answers reads from a scripted reply
/// queue (empty line once the queue drains), and can be told to fail writes
/// whose payload starts with a given prefix.
#[derive(Debug, Default)]
pub struct SimChannel {
    state: Mutex<SimState>,
}

impl SimChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues one scripted reply line for a future `read_line`.
    pub fn push_reply(&self, line: &str) {
        let mut state = self.state.lock().unwrap_or_else(|p| p.into_inner());
        state.replies.push_back(line.to_string());
    }

    /// Makes every write whose payload starts with `prefix` fail.
    ///
    /// Lets tests break the link for a single outlet while the rest keep
    /// working.
    pub fn fail_writes_starting_with(&self, prefix: &str) {
        let mut state = self.state.lock().unwrap_or_else(|p| p.into_inner());
        state.fail_prefixes.push(prefix.to_string());
    }

    /// Returns a copy of every payload written so far, in write order.
    pub fn written(&self) -> Vec<String> {
        let state = self.state.lock().unwrap_or_else(|p| p.into_inner());
        state.written.clone()
    }
}

impl DeviceChannel for SimChannel {
    fn write_all(&self, bytes: &[u8]) -> Result<(), TransportError> {
        let payload = String::from_utf8_lossy(bytes).into_owned();
        let mut state = self.state.lock().unwrap_or_else(|p| p.into_inner());
        if state.fail_prefixes.iter().any(|p| payload.starts_with(p.as_str())) {
            return Err(TransportError::Write(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "simulated write failure",
            )));
        }
        info!(frame = payload.trim_end(), "sim device write");
        state.written.push(payload);
        Ok(())
    }

    fn read_line(&self) -> Result<String, TransportError> {
        let mut state = self.state.lock().unwrap_or_else(|p| p.into_inner());
        Ok(state.replies.pop_front().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::CommandFrame;
    use crate::outlet::Outlet;

    #[test]
    fn test_records_frames_in_order() {
        let sim = SimChannel::new();
        sim.send(&CommandFrame::Dispense { outlet: Outlet::M1, count: 2 })
            .unwrap();
        sim.send(&CommandFrame::Alert).unwrap();
        assert_eq!(sim.written(), vec!["M1 2\n", "S1\n"]);
    }

    #[test]
    fn test_reads_scripted_replies_then_silence() {
        let sim = SimChannel::new();
        sim.push_reply("ok");
        assert_eq!(sim.read_line().unwrap(), "ok");
        assert_eq!(sim.read_line().unwrap(), "", "drained queue reads as silence");
    }

    #[test]
    fn test_injected_failure_only_hits_matching_prefix() {
        let sim = SimChannel::new();
        sim.fail_writes_starting_with("M2");

        assert!(sim
            .send(&CommandFrame::Dispense { outlet: Outlet::M2, count: 1 })
            .is_err());
        sim.send(&CommandFrame::Dispense { outlet: Outlet::M3, count: 1 })
            .unwrap();
        assert_eq!(sim.written(), vec!["M3 1\n"], "failed write must not be recorded");
    }
}
