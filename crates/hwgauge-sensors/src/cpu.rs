//! CPU temperature and load readers.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::command::CommandRunner;
use crate::sysfs::{list_prefixed, read_attr, read_millidegrees};
use crate::{Error, Result, PKG_TEMP_ZONE};

/// Program sampled for CPU load.
pub const TOP_PROGRAM: &str = "top";

/// Batch mode, a single iteration.
const TOP_ARGS: &[&str] = &["-b", "-n", "1"];

/// Summary line carrying the CPU state percentages.
const CPU_SUMMARY_MARKER: &str = "%Cpu(s)";

/// Matches the idle percentage, e.g. `95.8 id`.
static IDLE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+\.\d+)\s+id").expect("idle pattern is valid"));

/// Reads the CPU package temperature in degrees Celsius.
///
/// Scans every entry under `thermal_root` and returns the first zone whose
/// `type` contains `x86_pkg_temp`. Without one, `thermal_zone0` is used as an
/// approximation. The zone is looked up again on every call.
pub fn read_cpu_temp(thermal_root: &Path) -> Result<f64> {
    let entries = list_prefixed(thermal_root, "")?;

    for zone in &entries {
        // Cooling devices and zones without a type are skipped
        let Ok(zone_type) = read_attr(&zone.join("type")) else {
            continue;
        };
        if zone_type.contains(PKG_TEMP_ZONE) {
            return read_millidegrees(&zone.join("temp"));
        }
    }

    if entries.is_empty() {
        return Err(Error::NoThermalZones(thermal_root.to_path_buf()));
    }

    read_millidegrees(&thermal_root.join("thermal_zone0").join("temp"))
}

/// Reads the current CPU utilization percentage from a one-shot `top` run.
pub fn read_cpu_load(runner: &dyn CommandRunner) -> Result<f64> {
    let output = runner.run(TOP_PROGRAM, TOP_ARGS)?;
    let idle = parse_idle_percent(&output)?;
    Ok((100.0 - idle).clamp(0.0, 100.0))
}

/// Extracts the idle percentage from the `%Cpu(s)` line of `top` batch output.
///
/// Process rows are never searched.
pub fn parse_idle_percent(output: &str) -> Result<f64> {
    output
        .lines()
        .find(|line| line.contains(CPU_SUMMARY_MARKER))
        .and_then(|summary| IDLE_PATTERN.captures(summary))
        .and_then(|caps| caps[1].parse::<f64>().ok())
        .ok_or(Error::FieldNotFound {
            program: TOP_PROGRAM,
            field: "idle",
        })
}
