//! Attribute store over the IIO sysfs hierarchy.
//!
//! The HAL never touches sysfs directly: it goes through the
//! [`AttributeStore`] trait, which exposes typed scalar reads and writes
//! that may fail. [`SysfsStore`] is the filesystem-backed implementation;
//! [`IioPaths`] builds the per-device attribute and device file paths.
//!
//! Some reads are expected to fail, since not every device exposes every
//! attribute. Failures are reported at `trace`/`debug` level here and the
//! caller decides whether they matter.

use crate::error::{StoreError, StoreResult};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Typed access to scalar configuration attributes.
pub trait AttributeStore: Send {
    /// Read an attribute as a string, trailing whitespace removed.
    fn read_string(&self, path: &Path) -> StoreResult<String>;

    /// Write a string value to an attribute.
    fn write_string(&self, path: &Path, value: &str) -> StoreResult<()>;

    /// Check whether an attribute (or directory) exists.
    fn exists(&self, path: &Path) -> bool;

    /// Read an attribute as a signed integer.
    ///
    /// Only the leading integer is taken, so fixed-point values such as
    /// `10.000000` (reported by HID sensor drivers) read as `10`.
    fn read_int(&self, path: &Path) -> StoreResult<i64> {
        let raw = self.read_string(path)?;
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(StoreError::Empty {
                path: path.to_path_buf(),
            });
        }
        leading_int(trimmed).ok_or_else(|| StoreError::Parse {
            path: path.to_path_buf(),
            value: trimmed.to_string(),
        })
    }

    /// Read an attribute as a floating point value.
    fn read_float(&self, path: &Path) -> StoreResult<f64> {
        let raw = self.read_string(path)?;
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(StoreError::Empty {
                path: path.to_path_buf(),
            });
        }
        trimmed.parse().map_err(|_| StoreError::Parse {
            path: path.to_path_buf(),
            value: trimmed.to_string(),
        })
    }

    /// Write a signed integer to an attribute.
    fn write_int(&self, path: &Path, value: i64) -> StoreResult<()> {
        self.write_string(path, &value.to_string())
    }

    /// Write a floating point value to an attribute.
    fn write_float(&self, path: &Path, value: f64) -> StoreResult<()> {
        self.write_string(path, &value.to_string())
    }
}

/// Optional sign followed by at least one digit, at the start of `s`.
fn leading_int(s: &str) -> Option<i64> {
    let end = s
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || (i == 0 && matches!(c, '-' | '+'))))
        .map_or(s.len(), |(i, _)| i);
    s[..end].parse().ok()
}

/// Filesystem-backed attribute store.
#[derive(Debug, Clone, Copy, Default)]
pub struct SysfsStore;

impl SysfsStore {
    /// Create a new store.
    pub fn new() -> Self {
        Self
    }
}

impl AttributeStore for SysfsStore {
    fn read_string(&self, path: &Path) -> StoreResult<String> {
        let content = fs::read_to_string(path).map_err(|source| {
            trace!("Cannot read {:?} ({})", path, source);
            StoreError::Io {
                path: path.to_path_buf(),
                source,
            }
        })?;
        let value = content.trim_end().to_string();
        trace!("Read {:?} from {:?}", value, path);
        Ok(value)
    }

    fn write_string(&self, path: &Path, value: &str) -> StoreResult<()> {
        if value.is_empty() {
            return Err(StoreError::Empty {
                path: path.to_path_buf(),
            });
        }

        let io_err = |source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        };

        let mut file = OpenOptions::new()
            .write(true)
            .truncate(true)
            .open(path)
            .map_err(io_err)?;

        let written = file.write(value.as_bytes()).map_err(io_err)?;
        if written != value.len() {
            debug!("Short write to {:?}: {} of {}", path, written, value.len());
            return Err(StoreError::ShortWrite {
                path: path.to_path_buf(),
                written,
                expected: value.len(),
            });
        }

        trace!("Wrote {:?} to {:?}", value, path);
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

/// Path builder for IIO device attributes and character devices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IioPaths {
    sysfs_root: PathBuf,
    dev_root: PathBuf,
}

impl IioPaths {
    /// Create a path builder from the sysfs root and device directory.
    pub fn new(sysfs_root: impl Into<PathBuf>, dev_root: impl Into<PathBuf>) -> Self {
        Self {
            sysfs_root: sysfs_root.into(),
            dev_root: dev_root.into(),
        }
    }

    /// `<sysfs_root>/iio:deviceN`
    pub fn device_dir(&self, dev: usize) -> PathBuf {
        self.sysfs_root.join(format!("iio:device{dev}"))
    }

    /// Kernel-provided device name.
    pub fn name(&self, dev: usize) -> PathBuf {
        self.device_dir(dev).join("name")
    }

    /// Streaming buffer enable switch.
    pub fn buffer_enable(&self, dev: usize) -> PathBuf {
        self.device_dir(dev).join("buffer").join("enable")
    }

    /// Current trigger of the device.
    pub fn current_trigger(&self, dev: usize) -> PathBuf {
        self.device_dir(dev).join("trigger").join("current_trigger")
    }

    /// Attribute under `scan_elements/` (channel `_en`, `_type`, `_index`).
    pub fn scan_element(&self, dev: usize, attr: &str) -> PathBuf {
        self.device_dir(dev).join("scan_elements").join(attr)
    }

    /// Attribute directly under the device directory.
    pub fn attribute(&self, dev: usize, attr: &str) -> PathBuf {
        self.device_dir(dev).join(attr)
    }

    /// Character device delivering the combined binary reports.
    pub fn dev_file(&self, dev: usize) -> PathBuf {
        self.dev_root.join(format!("iio:device{dev}"))
    }
}
