//! Daemon entry point: flag parsing, wiring, and lifecycle.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

use dispenserd::{
    api, connect, spawn_file_mirror, trip_on_signal, AlarmStore, Config, DeviceChannel, DrugTable,
    Gateway, Notify, Scheduler, SimChannel, StatusFeed, WallClock,
};

#[derive(Parser, Debug)]
#[command(name = "dispenserd", version, about = "Pill dispenser control daemon")]
struct Cli {
    /// Address the HTTP API listens on.
    #[arg(long, default_value = "0.0.0.0:5000")]
    bind: SocketAddr,

    /// Serial device path for the actuator board.
    #[arg(long, default_value = "/dev/ttyACM0")]
    serial_path: String,

    /// Serial line rate.
    #[arg(long, default_value_t = 9600)]
    baud: u32,

    /// Device reply timeout, in seconds.
    #[arg(long, default_value_t = 1)]
    read_timeout_secs: u64,

    /// Scheduler scan period, in seconds. Values are clamped under one
    /// minute so a scheduled minute cannot pass unobserved.
    #[arg(long, default_value_t = 15)]
    tick_secs: u64,

    /// Pause between dispense frames when several outlets fire in one tick,
    /// in seconds.
    #[arg(long, default_value_t = 1)]
    gap_secs: u64,

    /// Drug table file (TOML). Omit to run with an empty table.
    #[arg(long)]
    drug_table: Option<PathBuf>,

    /// File the latest status message is mirrored to.
    #[arg(long, default_value = "/tmp/gui_message.txt")]
    message_file: PathBuf,

    /// Disable the message mirror file.
    #[arg(long)]
    no_message_file: bool,

    /// Skip the hardware port and use the simulated device.
    #[arg(long)]
    sim: bool,
}

impl Cli {
    fn into_config(self) -> Config {
        Config {
            bind: self.bind,
            serial_path: self.serial_path,
            baud: self.baud,
            read_timeout: Duration::from_secs(self.read_timeout_secs),
            tick: Duration::from_secs(self.tick_secs),
            command_gap: Duration::from_secs(self.gap_secs),
            drug_table: self.drug_table,
            message_file: if self.no_message_file {
                None
            } else {
                Some(self.message_file)
            },
            force_sim: self.sim,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cfg = Cli::parse().into_config();
    info!(version = env!("CARGO_PKG_VERSION"), "dispenserd starting");
    run(cfg).await
}

async fn run(cfg: Config) -> anyhow::Result<()> {
    let store = Arc::new(AlarmStore::new());
    let feed = StatusFeed::new();
    let notify: Arc<dyn Notify> = Arc::new(feed.clone());

    let device: Arc<dyn DeviceChannel> = if cfg.force_sim {
        info!("simulated device forced");
        Arc::new(SimChannel::new())
    } else {
        connect(&cfg.serial_path, cfg.baud, cfg.read_timeout)
    };

    let drugs = match &cfg.drug_table {
        Some(path) => {
            let table = DrugTable::load(path)
                .with_context(|| format!("loading drug table {}", path.display()))?;
            info!(path = %path.display(), entries = table.len(), "drug table loaded");
            Arc::new(table)
        }
        None => Arc::new(DrugTable::empty()),
    };

    let cancel = CancellationToken::new();

    let mirror = cfg
        .message_file
        .clone()
        .map(|path| spawn_file_mirror(&feed, path, cancel.clone()));

    // Keep the scan period sane no matter what the flags said.
    let tick = cfg.tick.clamp(Duration::from_secs(1), Duration::from_secs(55));
    let scheduler = Arc::new(Scheduler::new(
        store.clone(),
        device.clone(),
        notify.clone(),
        Arc::new(WallClock),
        tick,
        cfg.command_gap,
    ));
    let scheduler_task = tokio::spawn({
        let scheduler = scheduler.clone();
        let cancel = cancel.clone();
        async move { scheduler.run(cancel).await }
    });

    let gateway = Arc::new(Gateway::new(store, device, notify, drugs));
    let app = api::router(api::AppState {
        gateway,
        feed: feed.clone(),
    });

    let listener = tokio::net::TcpListener::bind(cfg.bind)
        .await
        .with_context(|| format!("binding {}", cfg.bind))?;
    info!(addr = %cfg.bind, "api listening");

    let signal_task = trip_on_signal(cancel.clone());
    axum::serve(listener, app)
        .with_graceful_shutdown({
            let cancel = cancel.clone();
            async move { cancel.cancelled().await }
        })
        .await
        .context("serving api")?;

    cancel.cancel();
    signal_task.abort();
    let _ = scheduler_task.await;
    if let Some(handle) = mirror {
        let _ = handle.await;
    }
    info!("dispenserd stopped");
    Ok(())
}
