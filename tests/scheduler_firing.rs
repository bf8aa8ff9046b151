//! Firing behavior of the scheduler against a simulated device.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveTime;
use tokio_util::sync::CancellationToken;

use dispenserd::{
    AlarmRecord, AlarmStore, ManualClock, Outlet, Scheduler, SimChannel, StatusFeed,
};

fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn armed(h: u32, m: u32, count: u32, drug: &str) -> AlarmRecord {
    AlarmRecord {
        time: Some(t(h, m)),
        count,
        drug_name: drug.to_string(),
    }
}

struct Rig {
    store: Arc<AlarmStore>,
    device: Arc<SimChannel>,
    feed: StatusFeed,
    scheduler: Scheduler,
}

fn rig_with_gap(gap: Duration) -> Rig {
    let store = Arc::new(AlarmStore::new());
    let device = Arc::new(SimChannel::new());
    let feed = StatusFeed::new();
    let scheduler = Scheduler::new(
        store.clone(),
        device.clone(),
        Arc::new(feed.clone()),
        Arc::new(ManualClock::new(t(0, 0))),
        Duration::from_secs(15),
        gap,
    );
    Rig {
        store,
        device,
        feed,
        scheduler,
    }
}

fn rig() -> Rig {
    rig_with_gap(Duration::ZERO)
}

#[tokio::test]
async fn test_due_alarm_fires_once_and_resets() {
    let rig = rig();
    rig.store.set(Outlet::M1, armed(8, 0, 2, "Aspirin"));

    let fired = rig.scheduler.fire_due(t(8, 0), &CancellationToken::new()).await;

    assert_eq!(fired, 1);
    assert_eq!(rig.device.written(), vec!["M1 2\n", "S1\n"]);
    assert_eq!(rig.feed.latest(), "dispensed: Aspirin (2)");

    let record = rig.store.get(Outlet::M1);
    assert_eq!(record.time, None, "time must be cleared after firing");
    assert_eq!(record.count, 0, "count must be cleared after firing");
    assert_eq!(record.drug_name, "Aspirin", "label must survive firing");
}

#[tokio::test]
async fn test_second_pass_same_minute_is_silent() {
    let rig = rig();
    rig.store.set(Outlet::M1, armed(8, 0, 2, "Aspirin"));
    let cancel = CancellationToken::new();

    rig.scheduler.fire_due(t(8, 0), &cancel).await;
    let fired = rig.scheduler.fire_due(t(8, 0), &cancel).await;

    assert_eq!(fired, 0, "a fired alarm must not fire again in the same minute");
    assert_eq!(rig.device.written().len(), 2);
}

#[tokio::test]
async fn test_outlets_fire_in_ascending_order_with_one_alert() {
    let rig = rig();
    rig.store.set(Outlet::M3, armed(9, 30, 1, "C"));
    rig.store.set(Outlet::M1, armed(9, 30, 3, "A"));

    let fired = rig.scheduler.fire_due(t(9, 30), &CancellationToken::new()).await;

    assert_eq!(fired, 2);
    assert_eq!(rig.device.written(), vec!["M1 3\n", "M3 1\n", "S1\n"]);
}

#[tokio::test]
async fn test_off_minute_and_disarmed_records_never_fire() {
    let rig = rig();
    rig.store.set(Outlet::M1, armed(8, 0, 2, "early"));
    rig.store.set(Outlet::M2, armed(7, 0, 0, "zero count"));

    let fired = rig.scheduler.fire_due(t(7, 0), &CancellationToken::new()).await;

    assert_eq!(fired, 0);
    assert!(rig.device.written().is_empty(), "no frame may be written");
    assert_eq!(rig.store.get(Outlet::M1).count, 2, "pending alarm must stay armed");
}

#[tokio::test]
async fn test_transport_failure_is_isolated_per_outlet() {
    let rig = rig();
    rig.device.fail_writes_starting_with("M2");
    rig.store.set(Outlet::M1, armed(12, 0, 1, "A"));
    rig.store.set(Outlet::M2, armed(12, 0, 1, "B"));
    rig.store.set(Outlet::M3, armed(12, 0, 1, "C"));

    let fired = rig.scheduler.fire_due(t(12, 0), &CancellationToken::new()).await;

    assert_eq!(fired, 2, "the broken outlet must not count as fired");
    assert_eq!(rig.device.written(), vec!["M1 1\n", "M3 1\n", "S1\n"]);
    assert_eq!(
        rig.store.get(Outlet::M2).count,
        0,
        "a failed outlet is still disarmed, not retried every tick"
    );
}

#[tokio::test]
async fn test_alert_is_skipped_when_nothing_fired() {
    let rig = rig();
    rig.device.fail_writes_starting_with("M");
    rig.store.set(Outlet::M1, armed(12, 0, 1, "A"));

    let fired = rig.scheduler.fire_due(t(12, 0), &CancellationToken::new()).await;

    assert_eq!(fired, 0);
    assert!(
        rig.device.written().is_empty(),
        "no alert may follow an all-failed pass"
    );
}

#[tokio::test]
async fn test_cancel_between_outlets_leaves_rest_armed() {
    let rig = rig_with_gap(Duration::from_secs(5));
    rig.store.set(Outlet::M1, armed(6, 0, 1, "A"));
    rig.store.set(Outlet::M2, armed(6, 0, 1, "B"));

    let cancel = CancellationToken::new();
    cancel.cancel();
    let fired = rig.scheduler.fire_due(t(6, 0), &cancel).await;

    assert_eq!(fired, 1, "the first outlet fires before the gap checks cancellation");
    assert_eq!(rig.device.written(), vec!["M1 1\n", "S1\n"]);
    assert_eq!(rig.store.get(Outlet::M2).count, 1, "unfired outlet must stay armed");
}

#[tokio::test(start_paused = true)]
async fn test_run_loop_fires_after_one_tick() {
    let rig = rig();
    rig.store.set(Outlet::M1, armed(0, 0, 1, "Aspirin"));

    let scheduler = Arc::new(rig.scheduler);
    let cancel = CancellationToken::new();
    let handle = tokio::spawn({
        let scheduler = scheduler.clone();
        let cancel = cancel.clone();
        async move { scheduler.run(cancel).await }
    });

    // Paused time advances past the 15 s tick without real waiting.
    tokio::time::sleep(Duration::from_secs(16)).await;
    assert_eq!(rig.device.written(), vec!["M1 1\n", "S1\n"]);
    assert_eq!(rig.feed.latest(), "dispensed: Aspirin (1)");

    cancel.cancel();
    handle.await.unwrap();
}
