//! Sensor and device tables.
//!
//! Both tables are populated once at startup (see [`crate::discovery`]) and
//! keep a fixed shape for the lifetime of the process: indices are stable
//! handles, only the mutable fields (counters, buffers, descriptors) change.

use crate::catalog::CatalogEntry;
use crate::type_spec::TypeSpec;
use iio_common::consts::{
    MAX_CHANNELS, MAX_DEVICES, MAX_NAME_SIZE, MAX_SENSOR_REPORT_SIZE, MAX_SENSORS,
    MAX_TYPE_SPEC_LEN,
};
use std::fs::File;

/// Stable sensor handle (index in the sensor table).
pub type SensorId = usize;

/// IIO device number (`N` in `iio:deviceN`).
pub type DeviceId = usize;

/// One scalar field of an event-driven sensor's report.
#[derive(Debug, Clone, Default)]
pub struct Channel {
    /// Last known `_en` state
    pub enabled: bool,
    /// Raw `_type` descriptor as read from sysfs
    pub type_spec: heapless::String<MAX_TYPE_SPEC_LEN>,
    /// Decoded descriptor, `None` until read or when malformed
    pub type_info: Option<TypeSpec>,
    /// Byte offset in the combined device report
    pub offset: usize,
    /// Byte size in the combined device report, 0 when not part of it
    pub size: usize,
}

/// One logical sensor.
#[derive(Debug)]
pub struct Sensor {
    /// Catalog entry this sensor was matched against
    pub catalog: &'static CatalogEntry,
    /// Owning device
    pub dev: DeviceId,
    /// Kernel device name, used to derive the trigger name
    pub internal_name: heapless::String<MAX_NAME_SIZE>,
    /// Number of consumers that enabled the sensor
    pub enable_count: u32,
    /// Monotonic time of the last propagated sample, in ns
    pub last_sample_ns: i64,
    /// Report channels, empty for poll-mode sensors
    pub channels: heapless::Vec<Channel, MAX_CHANNELS>,
    /// Compacted copy of this sensor's fields from the last device report
    pub report_buffer: [u8; MAX_SENSOR_REPORT_SIZE],
    /// A complete, current sample waits in `report_buffer`
    pub report_pending: bool,
    /// Sampling rate in Hz, 0 until set
    pub sampling_rate: u32,
    /// Calibration scale read at discovery
    pub scale: f64,
    /// Calibration offset read at discovery
    pub offset: f64,
}

impl Sensor {
    /// Create a sensor bound to `dev`.
    ///
    /// Event-driven sensors get one channel per catalog channel; poll-mode
    /// sensors get none.
    pub fn new(
        catalog: &'static CatalogEntry,
        dev: DeviceId,
        internal_name: &str,
        event_driven: bool,
    ) -> Self {
        let mut channels = heapless::Vec::new();
        if event_driven {
            for _ in catalog.channels.iter().take(MAX_CHANNELS) {
                let _ = channels.push(Channel::default());
            }
        }

        Self {
            catalog,
            dev,
            internal_name: bounded(internal_name),
            enable_count: 0,
            last_sample_ns: 0,
            channels,
            report_buffer: [0; MAX_SENSOR_REPORT_SIZE],
            report_pending: false,
            sampling_rate: 0,
            scale: 1.0,
            offset: 0.0,
        }
    }

    /// Human-readable name.
    pub fn friendly_name(&self) -> &'static str {
        self.catalog.friendly_name
    }

    /// Sampled on a timer rather than delivered through the device file.
    pub fn is_poll_mode(&self) -> bool {
        self.channels.is_empty()
    }

    /// At least one consumer has the sensor enabled.
    pub fn is_enabled(&self) -> bool {
        self.enable_count > 0
    }

    /// Bytes this sensor occupies in the combined device report.
    pub fn report_size(&self) -> usize {
        self.channels.iter().map(|c| c.size).sum()
    }

    /// Trigger name claimed by the first active sensor of a device.
    pub fn trigger_name(&self) -> String {
        format!("{}-dev{}", self.internal_name, self.dev)
    }
}

/// One IIO character device.
#[derive(Debug, Default)]
pub struct Device {
    /// Open `/dev/iio:deviceN`, if any sensor on the device is enabled
    pub file: Option<File>,
    /// The descriptor is part of the wait set
    pub registered: bool,
    /// Enabled poll-mode sensors on this device
    pub poll_sensors: u32,
    /// Enabled event-driven sensors on this device
    pub trigger_sensors: u32,
}

impl Device {
    /// The device file is open.
    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }

    /// Some sensor on the device is enabled.
    pub fn is_in_use(&self) -> bool {
        self.poll_sensors > 0 || self.trigger_sensors > 0
    }
}

/// Fixed-capacity sensor and device tables.
#[derive(Debug)]
pub struct SensorTable {
    sensors: heapless::Vec<Sensor, MAX_SENSORS>,
    devices: [Device; MAX_DEVICES],
}

impl SensorTable {
    /// Create empty tables.
    pub fn new() -> Self {
        Self {
            sensors: heapless::Vec::new(),
            devices: std::array::from_fn(|_| Device::default()),
        }
    }

    /// Append a sensor, returning its handle.
    ///
    /// Gives the sensor back if the table is full or its device number is
    /// out of range.
    pub fn push(&mut self, sensor: Sensor) -> Result<SensorId, Sensor> {
        if sensor.dev >= MAX_DEVICES {
            return Err(sensor);
        }
        let id = self.sensors.len();
        self.sensors.push(sensor)?;
        Ok(id)
    }

    /// Number of sensors.
    pub fn len(&self) -> usize {
        self.sensors.len()
    }

    /// No sensor was discovered.
    pub fn is_empty(&self) -> bool {
        self.sensors.is_empty()
    }

    /// All sensors in discovery order.
    pub fn sensors(&self) -> &[Sensor] {
        &self.sensors
    }

    /// Sensor by handle.
    pub fn sensor(&self, id: SensorId) -> Option<&Sensor> {
        self.sensors.get(id)
    }

    /// Mutable sensor by handle.
    pub fn sensor_mut(&mut self, id: SensorId) -> Option<&mut Sensor> {
        self.sensors.get_mut(id)
    }

    /// Device by number.
    pub fn device(&self, dev: DeviceId) -> Option<&Device> {
        self.devices.get(dev)
    }

    /// Mutable device by number.
    pub fn device_mut(&mut self, dev: DeviceId) -> Option<&mut Device> {
        self.devices.get_mut(dev)
    }

    /// Handles of the sensors bound to `dev`.
    pub fn sensors_on(&self, dev: DeviceId) -> impl Iterator<Item = SensorId> + '_ {
        self.sensors
            .iter()
            .enumerate()
            .filter(move |(_, s)| s.dev == dev)
            .map(|(id, _)| id)
    }

    /// Enabled poll-mode sensors across all devices.
    pub fn active_poll_sensors(&self) -> u32 {
        self.devices.iter().map(|d| d.poll_sensors).sum()
    }

    /// First sensor with a pending report, in discovery order.
    pub fn first_pending(&self) -> Option<SensorId> {
        self.sensors.iter().position(|s| s.report_pending)
    }

    /// Split borrow: one device and the whole sensor list.
    pub(crate) fn device_and_sensors_mut(
        &mut self,
        dev: DeviceId,
    ) -> Option<(&Device, &mut [Sensor])> {
        let device = self.devices.get(dev)?;
        Some((device, self.sensors.as_mut_slice()))
    }
}

impl Default for SensorTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Copy `s` into a bounded string, truncating at capacity.
pub(crate) fn bounded<const N: usize>(s: &str) -> heapless::String<N> {
    let mut out = heapless::String::new();
    for c in s.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}
