//! Alarm firing loop.
//!
//! ## Architecture
//!
//! ```text
//!        tick elapsed            due records
//!  Idle --------------> Firing --------------> frame per outlet
//!   ^                      |                   + reset_after_fire
//!   |                      |                   + one alert frame
//!   +----------------------+
//! ```
//!
//! ## Rules
//!
//! - A record fires at most once per scheduled minute: the snapshot of due
//!   records and the per-outlet reset bracket each firing, so a second tick
//!   inside the same minute sees nothing due.
//! - Outlets fire in ascending order with one command gap between them, so
//!   the actuator never drives two motors back to back.
//! - One outlet's transport failure is logged and does not stop the others,
//!   the alert frame, or the loop.
//! - The alert frame is written once per tick, and only if something fired.
//! - Cancellation is honored while idle and between outlets; the loop never
//!   sleeps while holding a lock.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveTime;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::device::DeviceChannel;
use crate::frame::CommandFrame;
use crate::notify::Notify;
use crate::store::AlarmStore;

enum Phase {
    Idle,
    Firing,
}

/// # Periodic alarm scanner.
///
/// Owns no state of its own; everything it touches is shared with the
/// gateway through `Arc`s.
pub struct Scheduler {
    store: Arc<AlarmStore>,
    device: Arc<dyn DeviceChannel>,
    notify: Arc<dyn Notify>,
    clock: Arc<dyn Clock>,
    tick: Duration,
    command_gap: Duration,
}

impl Scheduler {
    pub fn new(
        store: Arc<AlarmStore>,
        device: Arc<dyn DeviceChannel>,
        notify: Arc<dyn Notify>,
        clock: Arc<dyn Clock>,
        tick: Duration,
        command_gap: Duration,
    ) -> Self {
        Self {
            store,
            device,
            notify,
            clock,
            tick,
            command_gap,
        }
    }

    /// Runs the scan loop until `cancel` fires.
    ///
    /// The tick period must stay below one minute or a scheduled minute can
    /// pass unobserved; the configured default keeps a wide margin.
    pub async fn run(&self, cancel: CancellationToken) {
        info!(tick = ?self.tick, "scheduler started");
        let mut phase = Phase::Idle;
        loop {
            match phase {
                Phase::Idle => {
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        _ = tokio::time::sleep(self.tick) => phase = Phase::Firing,
                    }
                }
                Phase::Firing => {
                    let now = self.clock.now();
                    self.fire_due(now, &cancel).await;
                    phase = Phase::Idle;
                }
            }
        }
        info!("scheduler stopped");
    }

    /// Fires every record due at `now` and returns how many outlets fired.
    ///
    /// Public so callers with their own notion of time (tests, manual
    /// drains) can drive one firing pass deterministically.
    pub async fn fire_due(&self, now: NaiveTime, cancel: &CancellationToken) -> usize {
        let due = self.store.snapshot_due(now);
        if due.is_empty() {
            debug!(now = %now.format("%H:%M"), "nothing due");
            return 0;
        }

        let mut fired = 0;
        for (i, (outlet, record)) in due.iter().enumerate() {
            if i > 0 {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = tokio::time::sleep(self.command_gap) => {}
                }
            }

            let frame = CommandFrame::Dispense {
                outlet: *outlet,
                count: record.count,
            };
            match self.device.send(&frame) {
                Ok(()) => {
                    fired += 1;
                    info!(outlet = %outlet, count = record.count, "alarm fired");
                    self.notify
                        .publish(&format!(
                            "dispensed: {} ({})",
                            record.display_label(*outlet),
                            record.count
                        ))
                        .await;
                }
                Err(err) => {
                    warn!(outlet = %outlet, error = %err, "dispense frame failed");
                }
            }
            // Disarm even on failure; retrying a motor blind every tick is
            // worse than missing one dose.
            self.store.reset_after_fire(*outlet);
        }

        if fired > 0 {
            if let Err(err) = self.device.send(&CommandFrame::Alert) {
                warn!(error = %err, "alert frame failed");
            }
        }
        fired
    }
}
