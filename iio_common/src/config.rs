//! Configuration loading traits and types.
//!
//! This module provides a standardized way to load the HAL's TOML
//! configuration file.
//!
//! # Usage
//!
//! ```rust,no_run
//! use iio_common::config::{ConfigLoader, ConfigError, HalConfig};
//! use std::path::Path;
//!
//! fn main() -> Result<(), ConfigError> {
//!     let config = HalConfig::load(Path::new("/etc/iio_hal/hal.toml"))?;
//!     config.validate()?;
//!     println!("Service: {}", config.shared.service_name);
//!     Ok(())
//! }
//! ```

use crate::consts::{DEFAULT_DEV_ROOT, DEFAULT_SYSFS_ROOT, POLL_MIN_INTERVAL_US};
use crate::sysfs::IioPaths;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Error type for configuration loading operations.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// Configuration file not found at specified path.
    #[error("Configuration file not found")]
    FileNotFound,

    /// TOML parsing failed.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Semantic validation failed.
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

/// Log level for application logging.
///
/// Uses lowercase serde values for TOML compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Most verbose, per-cycle tracing information.
    Trace,
    /// Debug information useful during development.
    Debug,
    /// General information about application operation.
    #[default]
    Info,
    /// Warning messages for potentially problematic situations.
    Warn,
    /// Error messages for serious problems.
    Error,
}

impl LogLevel {
    /// Directive string understood by `tracing_subscriber::EnvFilter`.
    pub const fn as_directive(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Common configuration fields.
///
/// # TOML Example
///
/// ```toml
/// [shared]
/// log_level = "debug"
/// service_name = "iio-hal-tablet"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedConfig {
    /// Logging verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Application instance identifier.
    pub service_name: String,
}

impl SharedConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if `service_name` is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service_name.is_empty() {
            return Err(ConfigError::ValidationError(
                "service_name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Filesystem locations of the IIO hierarchy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PathsConfig {
    /// Root holding the `iio:deviceN` sysfs directories.
    pub sysfs_root: PathBuf,
    /// Directory holding the `iio:deviceN` character devices.
    pub dev_root: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            sysfs_root: PathBuf::from(DEFAULT_SYSFS_ROOT),
            dev_root: PathBuf::from(DEFAULT_DEV_ROOT),
        }
    }
}

/// Poll loop tuning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PollConfig {
    /// Minimum spacing between two waits, in microseconds.
    pub min_interval_us: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            min_interval_us: POLL_MIN_INTERVAL_US,
        }
    }
}

/// Complete HAL configuration (`hal.toml`).
///
/// # TOML Example
///
/// ```toml
/// [shared]
/// service_name = "iio-hal"
///
/// [paths]
/// sysfs_root = "/sys/bus/iio/devices"
/// dev_root = "/dev"
///
/// [poll]
/// min_interval_us = 10000
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HalConfig {
    /// Shared fields.
    pub shared: SharedConfig,
    /// IIO locations.
    #[serde(default)]
    pub paths: PathsConfig,
    /// Poll loop tuning.
    #[serde(default)]
    pub poll: PollConfig,
}

impl HalConfig {
    /// Configuration with default paths and timing.
    pub fn with_service_name(service_name: &str) -> Self {
        Self {
            shared: SharedConfig {
                log_level: LogLevel::default(),
                service_name: service_name.to_string(),
            },
            paths: PathsConfig::default(),
            poll: PollConfig::default(),
        }
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if:
    /// - `service_name` is empty
    /// - a path is empty
    /// - `min_interval_us` is zero
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;
        if self.paths.sysfs_root.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(
                "paths.sysfs_root cannot be empty".to_string(),
            ));
        }
        if self.paths.dev_root.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(
                "paths.dev_root cannot be empty".to_string(),
            ));
        }
        if self.poll.min_interval_us == 0 {
            return Err(ConfigError::ValidationError(
                "poll.min_interval_us must be > 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Path builder for the configured locations.
    pub fn iio_paths(&self) -> IioPaths {
        IioPaths::new(&self.paths.sysfs_root, &self.paths.dev_root)
    }

    /// Minimum spacing between two waits.
    pub fn min_poll_interval(&self) -> Duration {
        Duration::from_micros(self.poll.min_interval_us)
    }
}

/// Trait for loading configuration from TOML files.
///
/// # Contract
///
/// - Returns `ConfigError::FileNotFound` if the file does not exist
/// - Returns `ConfigError::ParseError` if TOML syntax is invalid
pub trait ConfigLoader: Sized + serde::de::DeserializeOwned {
    /// Load configuration from a TOML file.
    fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::FileNotFound
            } else {
                ConfigError::ParseError(e.to_string())
            }
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

// Blanket implementation for all types that implement DeserializeOwned.
impl<T: serde::de::DeserializeOwned> ConfigLoader for T {}
