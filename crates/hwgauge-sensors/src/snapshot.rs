//! Metrics snapshot handed from the poller to the display.

/// One reading of all four gauges.
///
/// Every field is a non-negative reading, or `0.0` when its source was
/// unavailable on that tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MetricsSnapshot {
    /// CPU package temperature in degrees Celsius.
    pub cpu_temp_c: f64,
    /// CPU utilization (0-100).
    pub cpu_load_pct: f64,
    /// GPU temperature in degrees Celsius.
    pub gpu_temp_c: f64,
    /// GPU utilization (0-100).
    pub gpu_load_pct: f64,
}

impl MetricsSnapshot {
    /// Creates a snapshot from the four readings.
    pub fn new(cpu_temp_c: f64, cpu_load_pct: f64, gpu_temp_c: f64, gpu_load_pct: f64) -> Self {
        Self {
            cpu_temp_c,
            cpu_load_pct,
            gpu_temp_c,
            gpu_load_pct,
        }
    }
}
