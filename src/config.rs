//! # Runtime configuration.
//!
//! [`Config`] defines the daemon's behavior: where the API listens, how the
//! serial device is opened, how often the scheduler scans, and which
//! auxiliary files are in play.
//!
//! # Example
//! ```
//! use std::time::Duration;
//! use dispenserd::Config;
//!
//! let mut cfg = Config::default();
//! cfg.tick = Duration::from_secs(30);
//! cfg.force_sim = true;
//!
//! assert_eq!(cfg.baud, 9600);
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for the dispenser daemon.
///
/// Controls the API listener, the device link, the scheduler cadence, and the
/// optional drug table and message mirror files.
#[derive(Clone, Debug)]
pub struct Config {
    /// Address the HTTP API listens on.
    pub bind: SocketAddr,
    /// Serial device path for the actuator board.
    pub serial_path: String,
    /// Serial line rate.
    pub baud: u32,
    /// Read timeout for device replies.
    pub read_timeout: Duration,
    /// Scheduler scan period. Must stay under one minute or a scheduled
    /// minute can pass unobserved.
    pub tick: Duration,
    /// Pause between dispense frames when several outlets fire in one tick.
    pub command_gap: Duration,
    /// Drug table file (TOML). `None` runs with an empty table.
    pub drug_table: Option<PathBuf>,
    /// File the latest status message is mirrored to. `None` disables the
    /// mirror.
    pub message_file: Option<PathBuf>,
    /// Skip the hardware port and use the simulated device.
    pub force_sim: bool,
}

impl Default for Config {
    /// Provides a default configuration:
    /// - `bind = 0.0.0.0:5000`
    /// - `serial_path = /dev/ttyACM0`, `baud = 9600`, `read_timeout = 1s`
    /// - `tick = 15s`, `command_gap = 1s`
    /// - `drug_table = None` (empty table)
    /// - `message_file = /tmp/gui_message.txt`
    /// - `force_sim = false`
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 5000)),
            serial_path: "/dev/ttyACM0".to_string(),
            baud: 9600,
            read_timeout: Duration::from_secs(1),
            tick: Duration::from_secs(15),
            command_gap: Duration::from_secs(1),
            drug_table: None,
            message_file: Some(PathBuf::from("/tmp/gui_message.txt")),
            force_sim: false,
        }
    }
}
