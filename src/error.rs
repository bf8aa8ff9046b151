//! Error types used by the dispenser runtime.
//!
//! This module defines two main error enums:
//!
//! - [`Error`]: the caller-facing taxonomy every gateway operation funnels into.
//! - [`TransportError`]: failures of the device link itself, wrapped into
//!   [`Error::Transport`] when they reach a caller.
//!
//! Validation errors (`InvalidOutlet`, `InvalidInput`) are raised before any
//! state mutation or device write, so a rejected request leaves the system
//! exactly as it was. A transport failure during an on-demand dispense is
//! surfaced to the caller with no automatic retry: re-driving a motor blindly
//! has physical side effects.

use thiserror::Error as ThisError;

/// Crate-wide result alias for gateway-level operations.
pub type Result<T> = std::result::Result<T, Error>;

/// # Errors produced by dispenser operations.
///
/// These map one-to-one onto the API's error envelope: the validation variants
/// are a caller mistake, the rest are a system fault.
#[non_exhaustive]
#[derive(ThisError, Debug)]
pub enum Error {
    /// Outlet identifier is not in the fixed set.
    #[error("unknown outlet {0:?} (expected one of M1, M2, M3)")]
    InvalidOutlet(String),

    /// Count, steps, or alarm time failed to parse or was out of range.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The device link failed while handling the request.
    #[error("device transport failed: {0}")]
    Transport(#[from] TransportError),

    /// Unexpected condition with no more specific classification.
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use dispenserd::Error;
    ///
    /// let err = Error::InvalidOutlet("M9".into());
    /// assert_eq!(err.as_label(), "invalid_outlet");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            Error::InvalidOutlet(_) => "invalid_outlet",
            Error::InvalidInput(_) => "invalid_input",
            Error::Transport(_) => "transport",
            Error::Internal(_) => "internal",
        }
    }

    /// Indicates whether the error was caused by the caller's input.
    ///
    /// Returns `true` for [`Error::InvalidOutlet`] and [`Error::InvalidInput`],
    /// `false` otherwise. The API layer maps validation errors to a bad-request
    /// response and everything else to an internal server error.
    ///
    /// # Example
    /// ```
    /// use dispenserd::Error;
    ///
    /// assert!(Error::InvalidInput("count".into()).is_validation());
    /// assert!(!Error::Internal("boom".into()).is_validation());
    /// ```
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::InvalidOutlet(_) | Error::InvalidInput(_))
    }
}

/// # Failures of the device link.
///
/// Raised by [`DeviceChannel`](crate::DeviceChannel) implementations.
/// A read timeout is *not* an error: `read_line` reports it as an empty line,
/// because the actuator firmware only talks back when it has something to say.
#[non_exhaustive]
#[derive(ThisError, Debug)]
pub enum TransportError {
    /// The serial port could not be opened.
    #[error("failed to open {port}: {source}")]
    Open {
        /// Path of the port that was attempted.
        port: String,
        /// The underlying serial failure.
        #[source]
        source: serialport::Error,
    },

    /// A write to the device failed or completed partially.
    #[error("device write failed: {0}")]
    Write(#[source] std::io::Error),

    /// A read from the device failed (excluding plain timeouts).
    #[error("device read failed: {0}")]
    Read(#[source] std::io::Error),
}

impl TransportError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            TransportError::Open { .. } => "transport_open",
            TransportError::Write(_) => "transport_write",
            TransportError::Read(_) => "transport_read",
        }
    }
}
