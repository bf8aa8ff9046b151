//! # dispenserd
//!
//! **Dispenserd** is the control daemon for a serial-attached pill dispenser.
//!
//! It accepts scheduling and dispense commands over a JSON HTTP API, tracks
//! one alarm per outlet, and drives a microcontroller over a line-framed
//! serial protocol when an alarm comes due or a caller asks for an immediate
//! dispense.
//!
//! ## Architecture
//! ```text
//!                    HTTP (axum)
//!      /dispense  /set_alarm  /get_alarms  /search ...
//!                        │
//!                        ▼
//!  ┌───────────────────────────────────────────┐
//!  │  Gateway (request core)                   │
//!  │  - validates outlet / steps / time first  │
//!  │  - immediate dispense, schedule writes    │
//!  │  - drug table lookups                     │
//!  └────────┬───────────────┬──────────────┬───┘
//!           │               │              │
//!           ▼               │              ▼
//!  ┌──────────────┐         │      ┌──────────────┐
//!  │  AlarmStore  │         │      │  StatusFeed  │──► file mirror,
//!  │ (per outlet) │         │      │ (last write) │    GET /message
//!  └────────┬─────┘         │      └──────▲───────┘
//!           │ snapshot_due  │             │
//!           ▼               │             │
//!  ┌──────────────┐         │             │
//!  │  Scheduler   │─────────┼─────────────┘
//!  │ (tick loop)  │         │
//!  └────────┬─────┘         │
//!           │ CommandFrame  │ CommandFrame
//!           ▼               ▼
//!  ┌───────────────────────────────────────────┐
//!  │  DeviceChannel (serial / simulated)       │
//!  │  "M1 2\n" per dispense, "S1\n" alert      │
//!  └───────────────────────────────────────────┘
//! ```
//!
//! ### Firing
//! ```text
//! every tick:
//!   ├─► now = clock.now()
//!   ├─► due = store.snapshot_due(now)        (outlet order)
//!   ├─► for each due outlet:
//!   │     ├─ send "Mx N\n"   (failure logged, others continue)
//!   │     ├─ publish "dispensed: <label> (<count>)"
//!   │     ├─ reset_after_fire  (time cleared, count 0, label kept)
//!   │     └─ pause one command gap before the next outlet
//!   └─► if anything fired: send "S1\n" once
//! ```
//!
//! ## Features
//! | Area              | Description                                          | Key types / traits                              |
//! |-------------------|------------------------------------------------------|-------------------------------------------------|
//! | **Scheduling**    | One alarm per outlet, fired once per scheduled minute. | [`AlarmStore`], [`AlarmRecord`], [`Scheduler`] |
//! | **Dispensing**    | Immediate dispense bypassing the schedule.           | [`Gateway`], [`DispenseReceipt`]                |
//! | **Device link**   | Line-framed serial transport with simulated fallback. | [`DeviceChannel`], [`SerialChannel`], [`SimChannel`] |
//! | **Notifications** | Last-write-wins status feed with a file mirror.      | [`Notify`], [`StatusFeed`]                      |
//! | **Drug table**    | Case-insensitive name lookup with precautions.       | [`DrugTable`], [`DrugMatch`]                    |
//! | **HTTP API**      | JSON route surface over the gateway.                 | [`api::router`], [`api::AppState`]              |
//! | **Errors**        | Typed validation and transport errors.               | [`Error`], [`TransportError`]                   |
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use chrono::NaiveTime;
//! use tokio_util::sync::CancellationToken;
//!
//! use dispenserd::{
//!     AlarmStore, DrugTable, Gateway, ManualClock, Scheduler, SimChannel, StatusFeed,
//! };
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(AlarmStore::new());
//!     let device = Arc::new(SimChannel::new());
//!     let feed = StatusFeed::new();
//!
//!     // Schedule two pills for 08:00 on the first outlet.
//!     let gateway = Gateway::new(
//!         store.clone(),
//!         device.clone(),
//!         Arc::new(feed.clone()),
//!         Arc::new(DrugTable::empty()),
//!     );
//!     gateway.set_alarm("M1", "08:00", 2, "Aspirin").await?;
//!
//!     // Production wiring calls `run()` with a wall clock; here we drive
//!     // one firing pass by hand.
//!     let eight = NaiveTime::from_hms_opt(8, 0, 0).ok_or("bad time")?;
//!     let scheduler = Scheduler::new(
//!         store,
//!         device.clone(),
//!         Arc::new(feed.clone()),
//!         Arc::new(ManualClock::new(eight)),
//!         Duration::from_secs(15),
//!         Duration::ZERO,
//!     );
//!     scheduler.fire_due(eight, &CancellationToken::new()).await;
//!
//!     assert_eq!(device.written(), vec!["M1 2\n", "S1\n"]);
//!     assert_eq!(feed.latest(), "dispensed: Aspirin (2)");
//!     Ok(())
//! }
//! ```

mod clock;
mod config;
mod device;
mod drugs;
mod error;
mod frame;
mod gateway;
mod notify;
mod outlet;
mod scheduler;
mod shutdown;
mod store;

pub mod api;

// ---- Public re-exports ----

pub use clock::{Clock, ManualClock, WallClock};
pub use config::Config;
pub use device::{connect, DeviceChannel, SerialChannel, SimChannel};
pub use drugs::{DrugMatch, DrugTable};
pub use error::{Error, Result, TransportError};
pub use frame::{CommandFrame, ALERT_LINE};
pub use gateway::{DispenseReceipt, Gateway};
pub use notify::{spawn_file_mirror, Notify, StatusFeed};
pub use outlet::Outlet;
pub use scheduler::Scheduler;
pub use shutdown::trip_on_signal;
pub use store::{parse_hhmm, AlarmRecord, AlarmStore};
