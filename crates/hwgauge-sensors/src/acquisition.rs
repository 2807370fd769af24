//! Sensor suite assembling one snapshot per tick.

use std::path::PathBuf;

use tracing::{info, warn};

use crate::command::{CommandRunner, SystemCommand};
use crate::gpu::{self, GpuDevice};
use crate::{cpu, MetricsSnapshot, Result, SysfsRoots};

/// Options for building a [`SensorSuite`].
#[derive(Debug, Clone)]
pub struct SuiteOptions {
    /// sysfs class roots to scan.
    pub roots: SysfsRoots,
    /// Fall back to the `sensors` edge temperature for GPU load.
    pub sensors_fallback: bool,
}

impl Default for SuiteOptions {
    fn default() -> Self {
        Self {
            roots: SysfsRoots::default(),
            sensors_fallback: true,
        }
    }
}

/// The four readers plus the GPU handle found at construction.
pub struct SensorSuite {
    thermal_root: PathBuf,
    gpu: Option<GpuDevice>,
    runner: Box<dyn CommandRunner>,
    sensors_fallback: bool,
}

impl SensorSuite {
    /// Creates a suite that runs external commands on the host.
    pub fn new(options: SuiteOptions) -> Self {
        Self::with_runner(options, Box::new(SystemCommand::new()))
    }

    /// Creates a suite with a custom command runner.
    ///
    /// GPU discovery happens here and only here.
    pub fn with_runner(options: SuiteOptions, runner: Box<dyn CommandRunner>) -> Self {
        let gpu = GpuDevice::discover(&options.roots.drm);
        match &gpu {
            Some(device) => info!("Using AMD GPU at {}", device.path().display()),
            None => warn!(
                "Could not find an AMD GPU in {}. GPU metrics will be 0.",
                options.roots.drm.display()
            ),
        }

        Self {
            thermal_root: options.roots.thermal,
            gpu,
            runner,
            sensors_fallback: options.sensors_fallback,
        }
    }

    /// Returns the GPU found at construction, if any.
    pub fn gpu(&self) -> Option<&GpuDevice> {
        self.gpu.as_ref()
    }

    /// Reads CPU temperature, CPU load, GPU temperature and GPU load, in that
    /// order, and assembles them into a snapshot.
    pub fn sample(&self) -> MetricsSnapshot {
        let cpu_temp_c = settle("CPU temp", cpu::read_cpu_temp(&self.thermal_root));
        let cpu_load_pct = settle("CPU load", cpu::read_cpu_load(self.runner.as_ref()));

        // Missing GPU was already reported at discovery
        let (gpu_temp_c, gpu_load_pct) = match &self.gpu {
            Some(device) => (
                settle("GPU temp", gpu::read_gpu_temp(device)),
                settle(
                    "GPU load",
                    gpu::read_gpu_load(device, self.runner.as_ref(), self.sensors_fallback),
                ),
            ),
            None => (0.0, 0.0),
        };

        MetricsSnapshot::new(cpu_temp_c, cpu_load_pct, gpu_temp_c, gpu_load_pct)
    }
}

/// Turns a reading into a gauge value, logging failures and substituting 0.
fn settle(metric: &str, reading: Result<f64>) -> f64 {
    match reading {
        Ok(value) if value.is_finite() => value.max(0.0),
        Ok(value) => {
            warn!("Error getting {}: non-finite reading {}", metric, value);
            0.0
        }
        Err(e) => {
            warn!("Error getting {}: {}", metric, e);
            0.0
        }
    }
}
