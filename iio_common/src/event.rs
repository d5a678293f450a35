//! Sensor types and the externally visible sensor event.
//!
//! `SensorEvent` is the fixed, versioned record handed to the consumer by
//! `poll()`. Its layout does not depend on the sensor: unused value slots
//! stay at zero.

use crate::consts::MAX_EVENT_FIELDS;
use serde::{Deserialize, Serialize};

/// Sensor type, numbered like the Android sensor HAL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum SensorType {
    /// Acceleration in m/s²
    Accelerometer = 1,
    /// Magnetic field in µT
    MagneticField = 2,
    /// Orientation in degrees
    Orientation = 3,
    /// Angular velocity in rad/s
    Gyroscope = 4,
    /// Illuminance in lux
    Light = 5,
    /// Pressure in hPa
    Pressure = 6,
    /// Device temperature in °C
    Temperature = 7,
    /// Distance in cm
    Proximity = 8,
    /// Rotation vector (quaternion)
    RotationVector = 11,
    /// Relative humidity in percent
    RelativeHumidity = 12,
    /// Ambient temperature in °C
    AmbientTemperature = 13,
    /// Vendor-specific sensor, not reported
    DevicePrivate = 0x10000,
}

impl SensorType {
    /// Number of values a sample of this type carries.
    ///
    /// Returns `None` for types that have no public sample layout.
    pub const fn field_count(self) -> Option<usize> {
        match self {
            Self::Accelerometer | Self::MagneticField | Self::Orientation | Self::Gyroscope => {
                Some(3)
            }
            Self::Light
            | Self::Temperature
            | Self::AmbientTemperature
            | Self::Proximity
            | Self::Pressure
            | Self::RelativeHumidity => Some(1),
            Self::RotationVector => Some(4),
            Self::DevicePrivate => None,
        }
    }
}

/// One typed sample delivered to the consumer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorEvent {
    /// Size of this struct, used as a format version
    pub version: u32,
    /// Sensor handle (index in the sensor table)
    pub sensor: usize,
    /// Sensor type
    pub sensor_type: SensorType,
    /// Monotonic timestamp in nanoseconds
    pub timestamp: i64,
    /// Sample values, `sensor_type.field_count()` of them meaningful
    pub data: [f32; MAX_EVENT_FIELDS],
}

impl SensorEvent {
    /// Format version stamped into every event.
    pub const VERSION: u32 = core::mem::size_of::<SensorEvent>() as u32;

    /// Create an empty event for the given sensor.
    pub fn new(sensor: usize, sensor_type: SensorType, timestamp: i64) -> Self {
        Self {
            version: Self::VERSION,
            sensor,
            sensor_type,
            timestamp,
            data: [0.0; MAX_EVENT_FIELDS],
        }
    }

    /// Meaningful values of this event.
    pub fn values(&self) -> &[f32] {
        let n = self.sensor_type.field_count().unwrap_or(0);
        &self.data[..n]
    }
}

impl Default for SensorEvent {
    fn default() -> Self {
        Self::new(0, SensorType::DevicePrivate, 0)
    }
}
