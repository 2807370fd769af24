//! Fixed-interval polling thread.
//!
//! The poller owns the sensor suite and runs on its own OS thread so that
//! blocking reads (sysfs, `top`, `sensors`) never stall the display. Each
//! snapshot crosses to the display thread over a bounded channel.

use hwgauge_sensors::{MetricsSnapshot, SensorSuite};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Produces one snapshot per tick.
pub trait Acquire: Send + 'static {
    fn acquire(&mut self) -> MetricsSnapshot;
}

impl Acquire for SensorSuite {
    fn acquire(&mut self) -> MetricsSnapshot {
        self.sample()
    }
}

/// Polling scheduler.
pub struct Poller<A> {
    source: A,
    tx: mpsc::Sender<MetricsSnapshot>,
    interval: Duration,
    ticks: Option<u64>,
}

impl<A: Acquire> Poller<A> {
    /// Creates a poller that runs until the display goes away.
    pub fn new(source: A, tx: mpsc::Sender<MetricsSnapshot>, interval: Duration) -> Self {
        Self {
            source,
            tx,
            interval,
            ticks: None,
        }
    }

    /// Stops after `ticks` snapshots have been delivered.
    pub fn with_ticks(mut self, ticks: u64) -> Self {
        self.ticks = Some(ticks);
        self
    }

    /// Starts the polling loop on a dedicated thread.
    pub fn spawn(self) -> std::io::Result<JoinHandle<()>> {
        thread::Builder::new()
            .name("hwgauge-poller".to_string())
            .spawn(move || self.run())
    }

    /// Runs the polling loop on the current thread.
    ///
    /// Each tick reads all metrics, delivers the snapshot, then sleeps for the
    /// interval. A slow read delays the next tick rather than shortening the
    /// sleep.
    pub fn run(mut self) {
        info!("Polling every {:?}", self.interval);
        let mut delivered: u64 = 0;

        loop {
            let snapshot = self.source.acquire();
            debug!("Sampled {:?}", snapshot);

            // Waits for room if the display is behind
            if self.tx.blocking_send(snapshot).is_err() {
                debug!("Display closed, stopping poller");
                return;
            }
            delivered += 1;

            if self.ticks.is_some_and(|limit| delivered >= limit) {
                debug!("Delivered {} snapshots, stopping poller", delivered);
                return;
            }

            thread::sleep(self.interval);
        }
    }
}
