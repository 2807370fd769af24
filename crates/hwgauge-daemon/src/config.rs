//! Configuration management.

use anyhow::{Context, Result};
use hwgauge_sensors::{SuiteOptions, SysfsRoots};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Main configuration structure.
///
/// Every field has a default, so running without a file is the normal case.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Delay between polling ticks in milliseconds
    #[serde(default = "default_interval")]
    pub interval: u64,

    /// Stop after this many snapshots (runs until interrupted if unset)
    #[serde(default)]
    pub ticks: Option<u64>,

    /// Snapshots that may queue between the poller and the display
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,

    /// sysfs locations
    #[serde(default)]
    pub sysfs: SysfsConfig,

    /// GPU reader configuration
    #[serde(default)]
    pub gpu: GpuConfig,

    /// Display configuration
    #[serde(default)]
    pub display: DisplayConfig,
}

/// sysfs class roots.
#[derive(Debug, Clone, Deserialize)]
pub struct SysfsConfig {
    #[serde(default = "default_thermal_root")]
    pub thermal_root: String,

    #[serde(default = "default_drm_root")]
    pub drm_root: String,
}

impl Default for SysfsConfig {
    fn default() -> Self {
        Self {
            thermal_root: default_thermal_root(),
            drm_root: default_drm_root(),
        }
    }
}

/// GPU reader configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct GpuConfig {
    /// Report the `sensors` edge temperature as load when
    /// `gpu_busy_percent` is missing
    #[serde(default = "default_true")]
    pub sensors_fallback: bool,
}

impl Default for GpuConfig {
    fn default() -> Self {
        Self {
            sensors_fallback: true,
        }
    }
}

/// Which display sink receives snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    /// Bar gauges redrawn on stdout.
    #[default]
    Terminal,
    /// Semicircle meters rendered to a PNG file.
    Png,
}

/// Display configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DisplayConfig {
    #[serde(default)]
    pub sink: SinkKind,

    /// Output file for the PNG sink
    #[serde(default = "default_png_path")]
    pub png_path: String,

    /// PNG frame width
    #[serde(default = "default_width")]
    pub width: u32,

    /// PNG frame height
    #[serde(default = "default_height")]
    pub height: u32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            sink: SinkKind::default(),
            png_path: default_png_path(),
            width: default_width(),
            height: default_height(),
        }
    }
}

// Default value functions
fn default_interval() -> u64 {
    2000
}

fn default_channel_capacity() -> usize {
    4
}

fn default_thermal_root() -> String {
    hwgauge_sensors::sysfs::THERMAL_ROOT.to_string()
}

fn default_drm_root() -> String {
    hwgauge_sensors::sysfs::DRM_ROOT.to_string()
}

fn default_true() -> bool {
    true
}

fn default_png_path() -> String {
    "hwgauge.png".to_string()
}

fn default_width() -> u32 {
    800
}

fn default_height() -> u32 {
    480
}

impl Config {
    /// Loads configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content =
            std::fs::read_to_string(path.as_ref()).context("Failed to read configuration file")?;
        let config: Config = toml::from_str(&content).context("Failed to parse configuration")?;
        Ok(config)
    }

    /// Returns the delay between polling ticks.
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval)
    }

    /// Returns the options for building the sensor suite.
    pub fn suite_options(&self) -> SuiteOptions {
        SuiteOptions {
            roots: SysfsRoots::new(&self.sysfs.thermal_root, &self.sysfs.drm_root),
            sensors_fallback: self.gpu.sensors_fallback,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            interval: default_interval(),
            ticks: None,
            channel_capacity: default_channel_capacity(),
            sysfs: SysfsConfig::default(),
            gpu: GpuConfig::default(),
            display: DisplayConfig::default(),
        }
    }
}
