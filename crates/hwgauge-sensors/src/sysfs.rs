//! sysfs locations and attribute helpers.

use std::fs;
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Default thermal class root.
pub const THERMAL_ROOT: &str = "/sys/class/thermal";

/// Default DRM class root.
pub const DRM_ROOT: &str = "/sys/class/drm";

/// Roots of the sysfs class trees the readers scan.
///
/// Tests point these at synthetic trees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SysfsRoots {
    /// Thermal zone class directory.
    pub thermal: PathBuf,
    /// Graphics device class directory.
    pub drm: PathBuf,
}

impl SysfsRoots {
    /// Creates roots from explicit paths.
    pub fn new(thermal: impl Into<PathBuf>, drm: impl Into<PathBuf>) -> Self {
        Self {
            thermal: thermal.into(),
            drm: drm.into(),
        }
    }
}

impl Default for SysfsRoots {
    fn default() -> Self {
        Self::new(THERMAL_ROOT, DRM_ROOT)
    }
}

/// Reads an attribute and trims the trailing newline.
pub fn read_attr(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .map(|s| s.trim().to_string())
        .map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })
}

/// Reads an attribute holding a plain integer.
pub fn read_int(path: &Path) -> Result<i64> {
    let value = read_attr(path)?;
    value.parse().map_err(|_| Error::Parse {
        path: path.to_path_buf(),
        value,
    })
}

/// Reads a millidegree Celsius attribute and converts it to degrees.
pub fn read_millidegrees(path: &Path) -> Result<f64> {
    Ok(read_int(path)? as f64 / 1000.0)
}

/// Lists the entries of `dir` whose names start with `prefix`, sorted by name.
pub fn list_prefixed(dir: &Path, prefix: &str) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|source| Error::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut paths: Vec<PathBuf> = entries
        .flatten()
        .filter(|entry| entry.file_name().to_string_lossy().starts_with(prefix))
        .map(|entry| entry.path())
        .collect();
    paths.sort();
    Ok(paths)
}
