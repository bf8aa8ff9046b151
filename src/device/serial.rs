//! Hardware serial transport.
//!
//! Wraps a [`serialport`] handle behind a mutex so concurrent callers cannot
//! interleave frame bytes. The port is opened once with a fixed read timeout;
//! a timed-out read is reported as an empty line per the
//! [`DeviceChannel`](super::DeviceChannel) contract.

use std::io::{ErrorKind, Read, Write};
use std::sync::Mutex;
use std::time::Duration;

use serialport::SerialPort;
use tracing::debug;

use crate::error::TransportError;

use super::DeviceChannel;

/// # Serial link to the actuator board.
///
/// Line discipline is plain text: one command per line, `\n` terminated,
/// answers (if any) likewise.
pub struct SerialChannel {
    port: Mutex<Box<dyn SerialPort>>,
}

impl SerialChannel {
    /// Opens `path` at `baud` with `timeout` applied to reads.
    pub fn open(path: &str, baud: u32, timeout: Duration) -> Result<Self, TransportError> {
        let port = serialport::new(path, baud)
            .timeout(timeout)
            .open()
            .map_err(|source| TransportError::Open {
                port: path.to_string(),
                source,
            })?;
        Ok(Self { port: Mutex::new(port) })
    }
}

impl DeviceChannel for SerialChannel {
    fn write_all(&self, bytes: &[u8]) -> Result<(), TransportError> {
        let mut port = self.port.lock().unwrap_or_else(|p| p.into_inner());
        port.write_all(bytes).map_err(TransportError::Write)?;
        port.flush().map_err(TransportError::Write)?;
        debug!(len = bytes.len(), "serial frame written");
        Ok(())
    }

    fn read_line(&self) -> Result<String, TransportError> {
        let mut port = self.port.lock().unwrap_or_else(|p| p.into_inner());
        let mut line = Vec::new();
        let mut byte = [0u8; 1];
        loop {
            match port.read(&mut byte) {
                Ok(0) => break,
                Ok(_) => {
                    if byte[0] == b'\n' {
                        break;
                    }
                    line.push(byte[0]);
                }
                // Silence within the timeout window is normal.
                Err(err) if err.kind() == ErrorKind::TimedOut => break,
                Err(err) => return Err(TransportError::Read(err)),
            }
        }
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        Ok(String::from_utf8_lossy(&line).into_owned())
    }
}
