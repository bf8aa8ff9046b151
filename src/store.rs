//! In-memory alarm table, one record per outlet.
//!
//! ## Rules
//!
//! - Every outlet always has a record; "no alarm" is a record with no time
//!   and a count of zero, never a missing entry.
//! - A record is *due* when its time matches the current time to the minute
//!   and its count is greater than zero. Seconds are ignored.
//! - After a firing the record's time and count are cleared but the drug
//!   name is kept, so the label survives until the next schedule.
//!
//! The table is shared between the gateway (writes on demand) and the
//! scheduler (reads every tick, clears after firing). Operations take the
//! lock for the duration of a single map access only, so no caller can
//! stall another behind device I/O.

use std::collections::BTreeMap;
use std::sync::Mutex;

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::outlet::Outlet;

/// Wire format for alarm times, and the sentinel for "unset".
const TIME_FORMAT: &str = "%H:%M";

/// Parses an `HH:MM` wall-clock string.
///
/// Rejects the empty string: callers that treat `""` as "unset" must do so
/// before parsing.
pub fn parse_hhmm(s: &str) -> Result<NaiveTime, Error> {
    NaiveTime::parse_from_str(s, TIME_FORMAT)
        .map_err(|_| Error::InvalidInput(format!("alarm time {s:?} is not HH:MM")))
}

/// # One outlet's alarm schedule.
///
/// Serializes with the time as an `HH:MM` string, empty when unset:
///
/// ```json
/// { "time": "08:00", "count": 2, "drug_name": "Aspirin" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlarmRecord {
    /// Scheduled time of day, `None` when no alarm is set.
    #[serde(with = "hhmm")]
    pub time: Option<NaiveTime>,
    /// Pills to dispense when the alarm fires. Zero disarms the record.
    pub count: u32,
    /// Free-form label shown in notifications. Survives a firing.
    pub drug_name: String,
}

impl AlarmRecord {
    /// Returns true when this record should fire at `now`.
    ///
    /// Matching is minute-granular, so a tick landing at `08:00:37` still
    /// fires an `08:00` alarm.
    pub fn is_due(&self, now: NaiveTime) -> bool {
        match self.time {
            Some(t) => self.count > 0 && t.hour() == now.hour() && t.minute() == now.minute(),
            None => false,
        }
    }

    /// Label for notifications: the drug name when present, the outlet
    /// otherwise.
    pub fn display_label(&self, outlet: Outlet) -> &str {
        if self.drug_name.is_empty() {
            outlet.as_str()
        } else {
            &self.drug_name
        }
    }
}

impl Default for AlarmRecord {
    fn default() -> Self {
        Self {
            time: None,
            count: 0,
            drug_name: String::new(),
        }
    }
}

/// # Shared alarm table.
///
/// Thread-safe map from outlet to [`AlarmRecord`], seeded with an empty
/// record for every outlet. Iteration order is outlet order (`M1` first).
#[derive(Debug)]
pub struct AlarmStore {
    inner: Mutex<BTreeMap<Outlet, AlarmRecord>>,
}

impl AlarmStore {
    /// Creates a table with an empty record for every outlet.
    pub fn new() -> Self {
        let mut map = BTreeMap::new();
        for outlet in Outlet::ALL {
            map.insert(outlet, AlarmRecord::default());
        }
        Self { inner: Mutex::new(map) }
    }

    /// Returns a copy of one outlet's record.
    pub fn get(&self, outlet: Outlet) -> AlarmRecord {
        let map = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        map.get(&outlet).cloned().unwrap_or_default()
    }

    /// Replaces one outlet's record wholesale.
    pub fn set(&self, outlet: Outlet, record: AlarmRecord) {
        let mut map = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        map.insert(outlet, record);
    }

    /// Returns a copy of the whole table, in outlet order.
    pub fn snapshot(&self) -> BTreeMap<Outlet, AlarmRecord> {
        let map = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        map.clone()
    }

    /// Returns the records due at `now`, in outlet order.
    ///
    /// The copy is taken under the lock in one shot; the caller then drives
    /// the device without holding it.
    pub fn snapshot_due(&self, now: NaiveTime) -> Vec<(Outlet, AlarmRecord)> {
        let map = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        map.iter()
            .filter(|(_, record)| record.is_due(now))
            .map(|(outlet, record)| (*outlet, record.clone()))
            .collect()
    }

    /// Disarms an outlet after it fired: clears time and count, keeps the
    /// drug name.
    pub fn reset_after_fire(&self, outlet: Outlet) {
        let mut map = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(record) = map.get_mut(&outlet) {
            record.time = None;
            record.count = 0;
        }
    }
}

impl Default for AlarmStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Serde codec mapping `Option<NaiveTime>` to an `HH:MM` string, with the
/// empty string standing in for `None`.
mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::TIME_FORMAT;

    pub fn serialize<S>(value: &Option<NaiveTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(t) => t.format(TIME_FORMAT).to_string().serialize(serializer),
            None => "".serialize(serializer),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        if raw.is_empty() {
            return Ok(None);
        }
        NaiveTime::parse_from_str(&raw, TIME_FORMAT)
            .map(Some)
            .map_err(serde::de::Error::custom)
    }
}
