//! # Command frames for the actuator link.
//!
//! The actuator board speaks a line-oriented ASCII protocol with exactly two
//! message shapes:
//!
//! ```text
//! "<outlet> <count>\n"   e.g. "M1 2\n"   → pulse the outlet's motor <count> times
//! "S1\n"                                 → play the speaker alert melody
//! ```
//!
//! Frames are ephemeral: they are built at the moment of a dispense or alert
//! and written straight to the [`DeviceChannel`](crate::DeviceChannel). The
//! board sends no acknowledgement; anything read back is informational.

use std::fmt;

use crate::outlet::Outlet;

/// Sentinel line that triggers the speaker alert.
pub const ALERT_LINE: &str = "S1\n";

/// One outbound instruction for the actuator board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandFrame {
    /// Pulse `outlet`'s motor `count` times.
    Dispense { outlet: Outlet, count: u32 },
    /// Sound the speaker alert.
    Alert,
}

impl CommandFrame {
    /// Encodes the frame as the newline-terminated wire line.
    pub fn encode(&self) -> String {
        match self {
            CommandFrame::Dispense { outlet, count } => format!("{outlet} {count}\n"),
            CommandFrame::Alert => ALERT_LINE.to_string(),
        }
    }
}

impl fmt::Display for CommandFrame {
    /// Renders the wire line without the trailing newline (for logs and
    /// receipts that embed the frame in a sentence).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandFrame::Dispense { outlet, count } => write!(f, "{outlet} {count}"),
            CommandFrame::Alert => f.write_str(ALERT_LINE.trim_end()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispense_encoding() {
        let frame = CommandFrame::Dispense {
            outlet: Outlet::M1,
            count: 2,
        };
        assert_eq!(frame.encode(), "M1 2\n");
    }

    #[test]
    fn test_alert_encoding() {
        assert_eq!(CommandFrame::Alert.encode(), "S1\n");
    }

    #[test]
    fn test_display_has_no_newline() {
        let frame = CommandFrame::Dispense {
            outlet: Outlet::M3,
            count: 10,
        };
        assert_eq!(frame.to_string(), "M3 10");
        assert_eq!(CommandFrame::Alert.to_string(), "S1");
    }
}
