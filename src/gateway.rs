//! Request core for dispense and scheduling operations.
//!
//! The gateway is what API handlers call. It composes the alarm store, the
//! device channel, the notification sink, and the drug table behind one
//! object with an operation per route.
//!
//! ## Rules
//!
//! - Validation happens first. A rejected request has touched neither the
//!   store nor the device.
//! - `dispense_now` writes straight to the device and never touches the
//!   alarm store; scheduled state belongs to the scheduler alone.
//! - Every successful operation with something to show publishes one status
//!   message. Publishing never fails and never blocks on a viewer.
//! - No operation waits on the scheduler; the longest a call can take is
//!   one device write plus one bounded read.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::device::DeviceChannel;
use crate::drugs::{DrugMatch, DrugTable};
use crate::error::{Error, Result};
use crate::frame::CommandFrame;
use crate::notify::Notify;
use crate::outlet::Outlet;
use crate::store::{parse_hhmm, AlarmRecord, AlarmStore};

/// # Receipt for an immediate dispense.
///
/// `command_sent` is the exact frame written to the device, terminator
/// included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispenseReceipt {
    pub outlet: Outlet,
    pub steps: u32,
    pub command_sent: String,
}

/// # Front door for dispenser operations.
///
/// Cheap to share; handlers hold it behind an `Arc` and call concurrently.
pub struct Gateway {
    store: Arc<AlarmStore>,
    device: Arc<dyn DeviceChannel>,
    notify: Arc<dyn Notify>,
    drugs: Arc<DrugTable>,
}

impl Gateway {
    pub fn new(
        store: Arc<AlarmStore>,
        device: Arc<dyn DeviceChannel>,
        notify: Arc<dyn Notify>,
        drugs: Arc<DrugTable>,
    ) -> Self {
        Self {
            store,
            device,
            notify,
            drugs,
        }
    }

    /// Dispenses immediately from one outlet, bypassing the alarm store.
    ///
    /// `steps` arrives as text from the caller and must parse as a positive
    /// integer. On success the receipt echoes the exact frame written.
    pub async fn dispense_now(&self, outlet: &str, steps: &str) -> Result<DispenseReceipt> {
        let outlet: Outlet = outlet.parse()?;
        let steps = parse_steps(steps)?;

        let frame = CommandFrame::Dispense {
            outlet,
            count: steps,
        };
        self.device.send(&frame)?;
        let reply = self.device.read_line()?;
        if !reply.is_empty() {
            debug!(outlet = %outlet, reply, "device replied");
        }

        info!(outlet = %outlet, steps, "manual dispense");
        self.notify
            .publish(&format!("dispensing {steps} from {outlet}"))
            .await;

        Ok(DispenseReceipt {
            outlet,
            steps,
            command_sent: frame.encode(),
        })
    }

    /// Schedules an alarm for one outlet, replacing any existing schedule.
    ///
    /// `time` must be `HH:MM`; `count` must be at least 1. Returns the
    /// stored record.
    pub async fn set_alarm(
        &self,
        outlet: &str,
        time: &str,
        count: u32,
        drug_name: &str,
    ) -> Result<AlarmRecord> {
        let outlet: Outlet = outlet.parse()?;
        if count < 1 {
            return Err(Error::InvalidInput("count must be at least 1".into()));
        }
        let time = parse_hhmm(time.trim())?;

        let record = AlarmRecord {
            time: Some(time),
            count,
            drug_name: drug_name.trim().to_string(),
        };
        self.store.set(outlet, record.clone());

        info!(outlet = %outlet, time = %time.format("%H:%M"), count, "alarm set");
        let label = record.display_label(outlet);
        self.notify
            .publish(&format!(
                "alarm set: {label} at {} x{count}",
                time.format("%H:%M")
            ))
            .await;

        Ok(record)
    }

    /// Returns every outlet's current record, in outlet order.
    pub fn list_alarms(&self) -> BTreeMap<Outlet, AlarmRecord> {
        self.store.snapshot()
    }

    /// Looks up drugs by name and publishes the result.
    ///
    /// Returns the hits; an empty result is not an error at this level, but
    /// a no-match notice still reaches the viewer.
    pub async fn search(&self, query: &str) -> Result<Vec<DrugMatch>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(Error::InvalidInput("search query is empty".into()));
        }

        let matches = self.drugs.search(query);
        if matches.is_empty() {
            info!(query, "drug search found nothing");
            self.notify
                .publish(&format!("no drug found matching {query:?}"))
                .await;
        } else {
            info!(query, hits = matches.len(), "drug search");
            let summary = matches
                .iter()
                .map(DrugMatch::summary)
                .collect::<Vec<_>>()
                .join("\n");
            self.notify.publish(&summary).await;
        }
        Ok(matches)
    }

    /// Plays the reminder melody on the device speaker.
    pub fn play_melody(&self) -> Result<()> {
        self.device.send(&CommandFrame::Alert)?;
        info!("melody requested");
        Ok(())
    }
}

fn parse_steps(raw: &str) -> Result<u32> {
    let steps: u32 = raw
        .trim()
        .parse()
        .map_err(|_| Error::InvalidInput(format!("steps {raw:?} is not a positive integer")))?;
    if steps < 1 {
        return Err(Error::InvalidInput("steps must be at least 1".into()));
    }
    Ok(steps)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_steps() {
        assert_eq!(parse_steps("3").unwrap(), 3);
        assert_eq!(parse_steps(" 12 ").unwrap(), 12);
        assert!(parse_steps("0").is_err());
        assert!(parse_steps("-1").is_err());
        assert!(parse_steps("two").is_err());
        assert!(parse_steps("").is_err());
    }
}
