//! hwgauge sensor acquisition
//!
//! Locates and reads CPU and AMD GPU temperature and utilization sources
//! exposed by Linux sysfs and a couple of userland tools (`top`, `sensors`).
//! Every reader is fault-isolated: [`SensorSuite::sample`] turns any failure
//! into a logged `0` for that metric instead of an error.

pub mod acquisition;
pub mod command;
pub mod cpu;
pub mod error;
pub mod gpu;
pub mod snapshot;
pub mod sysfs;

pub use acquisition::{SensorSuite, SuiteOptions};
pub use command::{CommandRunner, SystemCommand};
pub use error::{Error, Result};
pub use gpu::GpuDevice;
pub use snapshot::MetricsSnapshot;
pub use sysfs::SysfsRoots;

/// PCI vendor ID assigned to AMD.
pub const AMD_VENDOR_ID: &str = "0x1002";

/// Thermal zone type label for the CPU package sensor.
pub const PKG_TEMP_ZONE: &str = "x86_pkg_temp";
