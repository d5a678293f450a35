//! Prelude module for common re-exports.
//!
//! Consumers can do `use iio_common::prelude::*;` and get the most
//! important types without listing individual paths.

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, HalConfig, LogLevel, SharedConfig};

// ─── Errors ─────────────────────────────────────────────────────────
pub use crate::error::{HalError, StoreError, StoreResult};

// ─── Events ─────────────────────────────────────────────────────────
pub use crate::event::{SensorEvent, SensorType};

// ─── Sysfs ──────────────────────────────────────────────────────────
pub use crate::sysfs::{AttributeStore, IioPaths, SysfsStore};

// ─── System Constants ───────────────────────────────────────────────
pub use crate::consts::{MAX_CHANNELS, MAX_DEVICES, MAX_SENSORS, MAX_SENSOR_REPORT_SIZE};
