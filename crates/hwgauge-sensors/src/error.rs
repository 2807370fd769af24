//! Error types for sensor acquisition.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Reasons a single sensor read can fail.
///
/// These never leave [`crate::SensorSuite::sample`]; they are logged there and
/// the affected metric reads as `0`.
#[derive(Error, Debug)]
pub enum Error {
    /// A sysfs attribute or directory could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A sysfs attribute held something other than the expected number.
    #[error("unexpected value {value:?} in {path}")]
    Parse { path: PathBuf, value: String },

    /// No thermal zone could be found under the thermal class root.
    #[error("no thermal zones under {0}")]
    NoThermalZones(PathBuf),

    /// The GPU device has no hwmon subdirectory.
    #[error("no hwmon directory under {0}")]
    NoHwmon(PathBuf),

    /// The hwmon directory exposes no `temp*_input` file.
    #[error("no temperature input in {0}")]
    NoTempInput(PathBuf),

    /// A glob pattern could not be built from a sensor path.
    #[error("invalid glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    /// An external command could not be started.
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// An external command exited unsuccessfully.
    #[error("{program} exited with {status}")]
    CommandFailed { program: String, status: String },

    /// Command output did not contain the expected field.
    #[error("no {field} field in {program} output")]
    FieldNotFound {
        program: &'static str,
        field: &'static str,
    },

    /// The GPU busy-percent file is missing and no fallback is enabled.
    #[error("gpu_busy_percent unavailable at {0}")]
    BusyPercentUnavailable(PathBuf),
}
