//! System-wide constants for the IIO sensor HAL.
//!
//! Single source of truth for table capacities and default paths.
//! Imported by both crates; do not redefine these elsewhere.

use static_assertions::const_assert;

/// Canonical HAL service name (used for logging).
pub const HAL_SERVICE_NAME: &str = "iio_hal";

/// Maximum number of IIO devices (`iio:device0` .. `iio:device7`).
pub const MAX_DEVICES: usize = 8;

/// Maximum number of logical sensors across all devices.
pub const MAX_SENSORS: usize = 10;

/// Maximum number of channels per event-driven sensor.
pub const MAX_CHANNELS: usize = 4;

/// Size of a sensor's private report buffer in bytes.
pub const MAX_SENSOR_REPORT_SIZE: usize = 32;

/// Size of the scratch buffer a combined device report is read into.
pub const MAX_DEVICE_REPORT_SIZE: usize = MAX_SENSOR_REPORT_SIZE * MAX_SENSORS;

/// Highest accepted scan index (exclusive) for a channel.
pub const MAX_SCAN_INDEX: u32 = MAX_SENSORS as u32;

/// Maximum length of a channel type descriptor (e.g. `le:s12/16>>4`).
pub const MAX_TYPE_SPEC_LEN: usize = 32;

/// Maximum length of sensor and trigger names.
pub const MAX_NAME_SIZE: usize = 32;

/// Number of value slots carried by a sensor event.
pub const MAX_EVENT_FIELDS: usize = 16;

/// Minimum spacing between two consecutive waits, in microseconds.
pub const POLL_MIN_INTERVAL_US: u64 = 10_000;

/// Default root of the IIO sysfs hierarchy.
pub const DEFAULT_SYSFS_ROOT: &str = "/sys/bus/iio/devices";

/// Default directory holding the `iio:deviceN` character devices.
pub const DEFAULT_DEV_ROOT: &str = "/dev";

/// Default configuration file path.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/iio_hal/hal.toml";

// A channel is at most 64 bits of storage; all channels of a sensor must fit.
const_assert!(MAX_CHANNELS * 8 <= MAX_SENSOR_REPORT_SIZE);
const_assert!(MAX_EVENT_FIELDS >= MAX_CHANNELS);
