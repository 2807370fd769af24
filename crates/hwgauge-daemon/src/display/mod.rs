//! Display side of the poller channel.
//!
//! A [`Display`] owns the sink and is the only thing that touches it. It
//! drains snapshots from the poller's channel on the thread that runs it.

mod canvas;
mod meters;
mod terminal;

pub use canvas::Canvas;
pub use meters::PngDisplay;
pub use terminal::TerminalDisplay;

use anyhow::Result;
use hwgauge_sensors::MetricsSnapshot;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::config::{DisplayConfig, SinkKind};

/// Something that renders the four gauges.
pub trait DisplaySink {
    /// Returns the sink name.
    fn name(&self) -> &str;

    /// Renders one snapshot.
    fn show(&mut self, snapshot: &MetricsSnapshot) -> Result<()>;
}

/// One gauge as shown to the user.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gauge {
    pub label: &'static str,
    pub value: f64,
    pub unit: &'static str,
}

impl Gauge {
    /// Fraction of the 0-100 meter that is filled.
    pub fn fraction(&self) -> f64 {
        self.value.clamp(0.0, 100.0) / 100.0
    }

    /// Whole-number reading, truncated.
    pub fn whole(&self) -> i64 {
        self.value as i64
    }

    /// Subtext label, e.g. "45°C" or "87%".
    pub fn subtext(&self) -> String {
        format!("{}{}", self.whole(), self.unit)
    }
}

/// Splits a snapshot into its four gauges in display order.
pub fn gauges(snapshot: &MetricsSnapshot) -> [Gauge; 4] {
    [
        Gauge {
            label: "CPU Temp (°C)",
            value: snapshot.cpu_temp_c,
            unit: "°C",
        },
        Gauge {
            label: "CPU Load (%)",
            value: snapshot.cpu_load_pct,
            unit: "%",
        },
        Gauge {
            label: "GPU Temp (°C)",
            value: snapshot.gpu_temp_c,
            unit: "°C",
        },
        Gauge {
            label: "GPU Load (%)",
            value: snapshot.gpu_load_pct,
            unit: "%",
        },
    ]
}

/// Creates the sink selected in the configuration.
pub fn create_sink(config: &DisplayConfig) -> Result<Box<dyn DisplaySink>> {
    let sink: Box<dyn DisplaySink> = match config.sink {
        SinkKind::Terminal => Box::new(TerminalDisplay::stdout()),
        SinkKind::Png => Box::new(PngDisplay::new(
            &config.png_path,
            config.width,
            config.height,
        )?),
    };
    Ok(sink)
}

/// Minimum time between repeated sink error logs.
const ERROR_LOG_INTERVAL: Duration = Duration::from_secs(60);

/// Applies snapshots to a sink.
pub struct Display {
    sink: Box<dyn DisplaySink>,
    consecutive_errors: u32,
    last_error_log: Instant,
}

impl Display {
    /// Creates a display around a sink.
    pub fn new(sink: Box<dyn DisplaySink>) -> Self {
        info!("Using {} display", sink.name());
        Self {
            sink,
            consecutive_errors: 0,
            last_error_log: Instant::now(),
        }
    }

    /// Shows one snapshot. Sink errors are logged, never returned.
    pub fn apply(&mut self, snapshot: &MetricsSnapshot) {
        match self.sink.show(snapshot) {
            Ok(()) => self.consecutive_errors = 0,
            Err(e) => {
                self.consecutive_errors += 1;
                // Only log errors once per minute or on first error
                let elapsed = self.last_error_log.elapsed();
                if self.consecutive_errors == 1 {
                    warn!("Display error: {}", e);
                    self.last_error_log = Instant::now();
                } else if elapsed >= ERROR_LOG_INTERVAL {
                    warn!(
                        "Display error (repeated {} times in {:?}): {}",
                        self.consecutive_errors, elapsed, e
                    );
                    self.last_error_log = Instant::now();
                }
            }
        }
    }

    /// Drains the channel until the poller hangs up.
    ///
    /// Returns the number of snapshots shown.
    pub async fn run(&mut self, rx: &mut mpsc::Receiver<MetricsSnapshot>) -> u64 {
        let mut shown = 0;
        while let Some(snapshot) = rx.recv().await {
            self.apply(&snapshot);
            shown += 1;
        }
        shown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poller::{Acquire, Poller};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::thread::{self, ThreadId};
    use tracing::Level;
    use tracing_subscriber::layer::{Context, SubscriberExt};
    use tracing_subscriber::Layer;

    /// Records where and when each snapshot was shown.
    #[derive(Clone, Default)]
    struct Recorder {
        shown: Arc<Mutex<Vec<(ThreadId, Instant, MetricsSnapshot)>>>,
        fail: bool,
    }

    impl DisplaySink for Recorder {
        fn name(&self) -> &str {
            "recorder"
        }

        fn show(&mut self, snapshot: &MetricsSnapshot) -> Result<()> {
            self.shown
                .lock()
                .unwrap()
                .push((thread::current().id(), Instant::now(), *snapshot));
            if self.fail {
                anyhow::bail!("sink unavailable");
            }
            Ok(())
        }
    }

    /// Counts WARN events.
    struct WarnCounter(Arc<AtomicUsize>);

    impl<S: tracing::Subscriber> Layer<S> for WarnCounter {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            if *event.metadata().level() == Level::WARN {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    /// Fails while its switch is on.
    struct Flaky(Arc<AtomicBool>);

    impl DisplaySink for Flaky {
        fn name(&self) -> &str {
            "flaky"
        }

        fn show(&mut self, _snapshot: &MetricsSnapshot) -> Result<()> {
            if self.0.load(Ordering::SeqCst) {
                anyhow::bail!("sink unavailable");
            }
            Ok(())
        }
    }

    struct Fixed;

    impl Acquire for Fixed {
        fn acquire(&mut self) -> MetricsSnapshot {
            MetricsSnapshot::new(45.0, 12.5, 62.0, 37.0)
        }
    }

    #[test]
    fn test_gauges() {
        let gauges = gauges(&MetricsSnapshot::new(45.9, 87.5, 0.0, 150.0));
        let labels: Vec<_> = gauges.iter().map(|g| g.label).collect();
        assert_eq!(
            labels,
            ["CPU Temp (°C)", "CPU Load (%)", "GPU Temp (°C)", "GPU Load (%)"]
        );
        assert_eq!(gauges[0].subtext(), "45°C");
        assert_eq!(gauges[1].subtext(), "87%");
        assert_eq!(gauges[2].fraction(), 0.0);
        assert_eq!(gauges[3].fraction(), 1.0);
    }

    #[tokio::test]
    async fn test_snapshots_shown_on_display_thread() {
        let interval = Duration::from_millis(50);
        let recorder = Recorder::default();
        let mut display = Display::new(Box::new(recorder.clone()));

        let (tx, mut rx) = mpsc::channel(1);
        let poller = Poller::new(Fixed, tx, interval).with_ticks(4).spawn().unwrap();
        let poller_thread = poller.thread().id();

        assert_eq!(display.run(&mut rx).await, 4);
        poller.join().unwrap();

        let shown = recorder.shown.lock().unwrap();
        assert_eq!(shown.len(), 4);
        let here = thread::current().id();
        for (thread, _, snapshot) in shown.iter() {
            assert_eq!(*thread, here);
            assert_ne!(*thread, poller_thread);
            assert_eq!(*snapshot, MetricsSnapshot::new(45.0, 12.5, 62.0, 37.0));
        }

        // Spacing can only shrink by scheduling noise on the receiving side
        let tolerance = Duration::from_millis(25);
        for pair in shown.windows(2) {
            assert!(pair[1].1.duration_since(pair[0].1) + tolerance >= interval);
        }
    }

    #[tokio::test]
    async fn test_sink_errors_do_not_stop_display() {
        let recorder = Recorder {
            fail: true,
            ..Recorder::default()
        };
        let mut display = Display::new(Box::new(recorder.clone()));

        let (tx, mut rx) = mpsc::channel(4);
        for _ in 0..3 {
            tx.send(MetricsSnapshot::default()).await.unwrap();
        }
        drop(tx);

        assert_eq!(display.run(&mut rx).await, 3);
        assert_eq!(recorder.shown.lock().unwrap().len(), 3);
    }

    #[test]
    fn test_repeated_sink_errors_logged_once() {
        let warnings = Arc::new(AtomicUsize::new(0));
        let subscriber = tracing_subscriber::registry().with(WarnCounter(warnings.clone()));

        tracing::subscriber::with_default(subscriber, || {
            let failing = Arc::new(AtomicBool::new(true));
            let mut display = Display::new(Box::new(Flaky(failing.clone())));
            let snapshot = MetricsSnapshot::default();

            for _ in 0..10 {
                display.apply(&snapshot);
            }
            assert_eq!(warnings.load(Ordering::SeqCst), 1);

            // A good frame ends the run; the next failure is logged again
            failing.store(false, Ordering::SeqCst);
            display.apply(&snapshot);
            failing.store(true, Ordering::SeqCst);
            display.apply(&snapshot);
            assert_eq!(warnings.load(Ordering::SeqCst), 2);
        });
    }
}
