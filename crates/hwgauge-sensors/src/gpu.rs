//! AMD GPU discovery, temperature and load readers.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use glob::Pattern;
use regex::Regex;
use tracing::debug;

use crate::command::CommandRunner;
use crate::sysfs::{list_prefixed, read_attr, read_int, read_millidegrees};
use crate::{Error, Result, AMD_VENDOR_ID};

/// General hardware sensors report, used as the load fallback.
pub const SENSORS_PROGRAM: &str = "sensors";

/// Device-level utilization attribute.
const BUSY_PERCENT_FILE: &str = "gpu_busy_percent";

/// Matches the amdgpu edge temperature line, e.g. `edge:  +55.0°C`.
static EDGE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"edge:\s+\+([\d.]+)°C").expect("edge pattern is valid"));

/// A discovered AMD GPU, pointing at its `/sys/class/drm/cardN/device` directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GpuDevice {
    path: PathBuf,
}

impl GpuDevice {
    /// Wraps an already known device directory.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Finds the first `card*` entry under `drm_root` whose device has a
    /// hwmon directory and an AMD vendor ID.
    pub fn discover(drm_root: &Path) -> Option<Self> {
        let cards = match list_prefixed(drm_root, "card") {
            Ok(cards) => cards,
            Err(e) => {
                debug!("GPU discovery could not list cards: {}", e);
                return None;
            }
        };

        cards.into_iter().find_map(|card| {
            let device = card.join("device");
            if !device.join("hwmon").is_dir() {
                return None;
            }
            let vendor = read_attr(&device.join("vendor")).ok()?;
            if vendor.contains(AMD_VENDOR_ID) {
                debug!("Found AMD GPU at {}", device.display());
                Some(Self::new(device))
            } else {
                None
            }
        })
    }

    /// Returns the device directory.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the first `hwmon*` directory beneath the device.
    fn hwmon_dir(&self) -> Result<PathBuf> {
        let hwmon_root = self.path.join("hwmon");
        first_match(&hwmon_root, "hwmon*")?.ok_or(Error::NoHwmon(hwmon_root))
    }
}

/// Returns the first (sorted) entry of `dir` matching a glob `pattern`.
fn first_match(dir: &Path, pattern: &str) -> Result<Option<PathBuf>> {
    let full = format!("{}/{}", Pattern::escape(&dir.to_string_lossy()), pattern);
    Ok(glob::glob(&full)?.flatten().next())
}

/// Reads the GPU temperature in degrees Celsius from the first
/// `temp*_input` of the device's hwmon directory.
pub fn read_gpu_temp(device: &GpuDevice) -> Result<f64> {
    let hwmon = device.hwmon_dir()?;
    let input = first_match(&hwmon, "temp*_input")?.ok_or(Error::NoTempInput(hwmon))?;
    read_millidegrees(&input)
}

/// Reads GPU utilization.
///
/// `gpu_busy_percent` is returned as-is. When it cannot be read and
/// `sensors_fallback` is set, the edge temperature from `sensors` is returned
/// in its place, truncated to a whole number. That value is a temperature,
/// not a load.
pub fn read_gpu_load(
    device: &GpuDevice,
    runner: &dyn CommandRunner,
    sensors_fallback: bool,
) -> Result<f64> {
    let busy_path = device.path.join(BUSY_PERCENT_FILE);
    let err = match read_int(&busy_path) {
        Ok(busy) => return Ok(busy as f64),
        Err(e) => e,
    };

    debug!("Could not read {}: {}", BUSY_PERCENT_FILE, err);
    if !sensors_fallback {
        return Err(Error::BusyPercentUnavailable(busy_path));
    }

    let output = runner.run(SENSORS_PROGRAM, &[])?;
    let edge = parse_edge_temp(&output)?;
    debug!("Reporting edge temperature {}°C as GPU load", edge);
    Ok(edge.trunc())
}

/// Extracts the amdgpu `edge` temperature from `sensors` output.
pub fn parse_edge_temp(output: &str) -> Result<f64> {
    EDGE_PATTERN
        .captures(output)
        .and_then(|caps| caps[1].parse::<f64>().ok())
        .ok_or(Error::FieldNotFound {
            program: SENSORS_PROGRAM,
            field: "edge",
        })
}
