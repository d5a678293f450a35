//! Catalog of supported sensor types.
//!
//! Each entry describes how a sensor shows up under an IIO device (its
//! attribute tag and channel stems) and which [`SensorKind`] handles its
//! samples. The kind is resolved once at discovery and stored on the
//! sensor record, so the hot path never switches on strings.

use crate::table::Sensor;
use iio_common::event::{SensorEvent, SensorType};
use iio_common::sysfs::{AttributeStore, IioPaths};
use tracing::warn;

/// Conversion factor from gauss (IIO) to microtesla.
const GAUSS_TO_MICROTESLA: f32 = 100.0;

/// Conversion factor from kilopascal (IIO) to hectopascal.
const KPA_TO_HPA: f32 = 10.0;

/// Closed set of sensor categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorKind {
    /// 3-axis accelerometer
    Accelerometer,
    /// 3-axis gyroscope
    Gyroscope,
    /// 3-axis magnetometer
    Magnetometer,
    /// 3-axis inclinometer (orientation)
    Inclinometer,
    /// Quaternion rotation vector
    RotationVector,
    /// Ambient light
    Light,
    /// Ambient temperature
    Temperature,
    /// Proximity
    Proximity,
    /// Barometric pressure
    Pressure,
    /// Relative humidity
    Humidity,
}

/// Sample handling capability shared by every sensor kind.
pub trait SensorOps {
    /// Convert the raw bytes of report field `field` into a value.
    ///
    /// `raw` starts at the field; it may be longer than the field.
    fn transform(&self, sensor: &Sensor, field: usize, raw: &[u8]) -> f32 {
        let Some(spec) = sensor.channels.get(field).and_then(|c| c.type_info) else {
            return 0.0;
        };
        match spec.decode(raw) {
            Some(value) => ((value as f64 + sensor.offset) * sensor.scale) as f32,
            None => 0.0,
        }
    }

    /// Read field `field` of a poll-mode sensor straight from sysfs.
    fn acquire_immediate_value(
        &self,
        sensor: &Sensor,
        field: usize,
        store: &dyn AttributeStore,
        paths: &IioPaths,
    ) -> f32 {
        let Some(stem) = sensor.catalog.channels.get(field) else {
            return 0.0;
        };
        let path = paths.attribute(sensor.dev, &stem.raw_attr());
        match store.read_int(&path) {
            Ok(raw) => ((raw as f64 + sensor.offset) * sensor.scale) as f32,
            Err(e) => {
                warn!("Cannot acquire {} field {}: {}", sensor.friendly_name(), field, e);
                0.0
            }
        }
    }

    /// Sensor-specific post-processing of a complete event.
    fn finalize(&self, sensor: &Sensor, event: &mut SensorEvent);
}

impl SensorOps for SensorKind {
    fn finalize(&self, _sensor: &Sensor, event: &mut SensorEvent) {
        match self {
            Self::Magnetometer => {
                for v in &mut event.data[..3] {
                    *v *= GAUSS_TO_MICROTESLA;
                }
            }
            // milli-degrees Celsius
            Self::Temperature => event.data[0] /= 1000.0,
            Self::Pressure => event.data[0] *= KPA_TO_HPA,
            // milli-percent
            Self::Humidity => event.data[0] /= 1000.0,
            Self::Accelerometer
            | Self::Gyroscope
            | Self::Inclinometer
            | Self::RotationVector
            | Self::Light
            | Self::Proximity => {}
        }
    }
}

/// Channel name stem (e.g. `in_accel_x`) and its derived attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelStem(pub &'static str);

impl ChannelStem {
    /// `scan_elements/<stem>_en`
    pub fn en_attr(&self) -> String {
        format!("{}_en", self.0)
    }

    /// `scan_elements/<stem>_type`
    pub fn type_attr(&self) -> String {
        format!("{}_type", self.0)
    }

    /// `scan_elements/<stem>_index`
    pub fn index_attr(&self) -> String {
        format!("{}_index", self.0)
    }

    /// `<stem>_raw`, read for poll-mode sampling
    pub fn raw_attr(&self) -> String {
        format!("{}_raw", self.0)
    }
}

/// One supported sensor type.
#[derive(Debug)]
pub struct CatalogEntry {
    /// Attribute tag (`in_<tag>_scale`, `in_<tag>_sampling_frequency`)
    pub tag: &'static str,
    /// Sample handler
    pub kind: SensorKind,
    /// Type reported in events
    pub sensor_type: SensorType,
    /// Human-readable name
    pub friendly_name: &'static str,
    /// Channel stems, in report field order
    pub channels: &'static [ChannelStem],
}

impl CatalogEntry {
    /// `in_<tag>_scale`
    pub fn scale_attr(&self) -> String {
        format!("in_{}_scale", self.tag)
    }

    /// `in_<tag>_offset`
    pub fn offset_attr(&self) -> String {
        format!("in_{}_offset", self.tag)
    }

    /// `in_<tag>_sampling_frequency`
    pub fn sampling_frequency_attr(&self) -> String {
        format!("in_{}_sampling_frequency", self.tag)
    }
}

/// Built-in catalog, in discovery order.
pub static CATALOG: [CatalogEntry; 10] = [
    CatalogEntry {
        tag: "accel",
        kind: SensorKind::Accelerometer,
        sensor_type: SensorType::Accelerometer,
        friendly_name: "Accelerometer",
        channels: &[
            ChannelStem("in_accel_x"),
            ChannelStem("in_accel_y"),
            ChannelStem("in_accel_z"),
        ],
    },
    CatalogEntry {
        tag: "anglvel",
        kind: SensorKind::Gyroscope,
        sensor_type: SensorType::Gyroscope,
        friendly_name: "Gyroscope",
        channels: &[
            ChannelStem("in_anglvel_x"),
            ChannelStem("in_anglvel_y"),
            ChannelStem("in_anglvel_z"),
        ],
    },
    CatalogEntry {
        tag: "magn",
        kind: SensorKind::Magnetometer,
        sensor_type: SensorType::MagneticField,
        friendly_name: "Magnetometer",
        channels: &[
            ChannelStem("in_magn_x"),
            ChannelStem("in_magn_y"),
            ChannelStem("in_magn_z"),
        ],
    },
    CatalogEntry {
        tag: "incli",
        kind: SensorKind::Inclinometer,
        sensor_type: SensorType::Orientation,
        friendly_name: "Orientation",
        channels: &[
            ChannelStem("in_incli_x"),
            ChannelStem("in_incli_y"),
            ChannelStem("in_incli_z"),
        ],
    },
    CatalogEntry {
        tag: "rot",
        kind: SensorKind::RotationVector,
        sensor_type: SensorType::RotationVector,
        friendly_name: "Rotation Vector",
        channels: &[
            ChannelStem("in_rot_quat_x"),
            ChannelStem("in_rot_quat_y"),
            ChannelStem("in_rot_quat_z"),
            ChannelStem("in_rot_quat_w"),
        ],
    },
    CatalogEntry {
        tag: "illuminance",
        kind: SensorKind::Light,
        sensor_type: SensorType::Light,
        friendly_name: "Ambient Light",
        channels: &[ChannelStem("in_illuminance")],
    },
    CatalogEntry {
        tag: "temp",
        kind: SensorKind::Temperature,
        sensor_type: SensorType::AmbientTemperature,
        friendly_name: "Temperature",
        channels: &[ChannelStem("in_temp")],
    },
    CatalogEntry {
        tag: "proximity",
        kind: SensorKind::Proximity,
        sensor_type: SensorType::Proximity,
        friendly_name: "Proximity",
        channels: &[ChannelStem("in_proximity")],
    },
    CatalogEntry {
        tag: "pressure",
        kind: SensorKind::Pressure,
        sensor_type: SensorType::Pressure,
        friendly_name: "Pressure",
        channels: &[ChannelStem("in_pressure")],
    },
    CatalogEntry {
        tag: "humidityrelative",
        kind: SensorKind::Humidity,
        sensor_type: SensorType::RelativeHumidity,
        friendly_name: "Relative Humidity",
        channels: &[ChannelStem("in_humidityrelative")],
    },
];

/// Catalog entry of a sensor kind.
pub fn find_entry(kind: SensorKind) -> &'static CatalogEntry {
    CATALOG
        .iter()
        .find(|e| e.kind == kind)
        .unwrap_or(&CATALOG[0])
}

/// Catalog entry matching an attribute tag (`accel`, `temp`, ...).
pub fn find_by_tag(tag: &str) -> Option<&'static CatalogEntry> {
    CATALOG.iter().find(|e| e.tag == tag)
}
