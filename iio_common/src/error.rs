//! Error types for HAL and attribute store operations.
//!
//! This module defines:
//! - `HalError` enum - Errors surfaced by the consumer-facing HAL operations
//! - `StoreError` enum - Errors from the sysfs attribute store
//!
//! Store errors are transient by nature: the HAL logs them and skips the
//! affected item. They only turn into a `HalError` when they block a
//! requested state transition.

use std::path::PathBuf;
use thiserror::Error;

/// Error types for HAL operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HalError {
    /// Wait instance or wake channel could not be created
    #[error("Initialization failed: {0}")]
    InitFailed(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Device file could not be opened or watched
    #[error("Hardware error: {0}")]
    HardwareError(String),

    /// Disable request on a sensor that is not enabled
    #[error("Spurious disable of sensor {sensor}")]
    SpuriousDisable {
        /// Sensor handle
        sensor: usize,
    },

    /// Rejected argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Sensor handle outside the sensor table
    #[error("Invalid sensor handle: {0}")]
    InvalidHandle(usize),
}

/// Errors from reading or writing sysfs attributes.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Attribute could not be opened, read or written
    #[error("I/O error on {path:?}: {source}")]
    Io {
        /// Attribute path
        path: PathBuf,
        /// Source IO error
        #[source]
        source: std::io::Error,
    },

    /// Attribute content is not a valid number
    #[error("Cannot parse {value:?} from {path:?}")]
    Parse {
        /// Attribute path
        path: PathBuf,
        /// Raw content (trimmed)
        value: String,
    },

    /// Attribute is empty, or an empty value was to be written
    #[error("Empty value for {path:?}")]
    Empty {
        /// Attribute path
        path: PathBuf,
    },

    /// Fewer bytes written than requested
    #[error("Short write to {path:?}: {written} of {expected} bytes")]
    ShortWrite {
        /// Attribute path
        path: PathBuf,
        /// Bytes actually written
        written: usize,
        /// Bytes requested
        expected: usize,
    },
}

/// Result type for attribute store operations.
pub type StoreResult<T> = Result<T, StoreError>;
