//! hwgauge daemon
//!
//! Polls CPU and AMD GPU temperature and load every couple of seconds on a
//! background thread and shows them as four gauges.

mod config;
mod display;
mod poller;

use anyhow::{Context, Result};
use hwgauge_sensors::SensorSuite;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::Config;
use display::Display;
use poller::Poller;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Setup logging; stdout belongs to the terminal display
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    // Load configuration, if a path was given
    let config = match std::env::args().nth(1) {
        Some(path) => {
            let config = Config::load(&path).context("Failed to load configuration")?;
            info!("Loaded configuration from: {}", path);
            config
        }
        None => Config::default(),
    };

    let suite = SensorSuite::new(config.suite_options());
    let mut display = Display::new(display::create_sink(&config.display)?);

    // The display owns the sink; the poller only ever sends
    let (tx, mut rx) = mpsc::channel(config.channel_capacity.max(1));
    let mut poller = Poller::new(suite, tx, config.interval());
    if let Some(ticks) = config.ticks {
        poller = poller.with_ticks(ticks);
    }
    poller.spawn().context("Failed to start poller thread")?;

    let mut sigterm =
        signal(SignalKind::terminate()).context("Failed to install SIGTERM handler")?;
    let mut sigint = signal(SignalKind::interrupt()).context("Failed to install SIGINT handler")?;

    tokio::select! {
        shown = display.run(&mut rx) => {
            info!("Poller stopped after {} snapshots", shown);
        }
        _ = sigterm.recv() => {
            info!("Received SIGTERM, shutting down");
        }
        _ = sigint.recv() => {
            info!("Received SIGINT, shutting down");
        }
    }

    Ok(())
}
