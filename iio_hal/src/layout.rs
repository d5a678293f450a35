//! Channel layout resolution.
//!
//! A device's combined report is the concatenation of every enabled scan
//! element, ordered by scan index. Several sensors may share one device,
//! so the offsets of a sensor's channels depend on which channels of the
//! *other* sensors are enabled. This module re-reads `_en`, `_type` and
//! `_index` for every channel bound to a device and recomputes offsets and
//! sizes.
//!
//! The resolution assumes discovery of every channel on the device: an
//! enabled scan element that no sensor knows about leaves a hole that is
//! not accounted for. Channels sharing one scan index (masked into the same
//! storage) are not supported; the later one is dropped.

use crate::table::{DeviceId, SensorId, SensorTable, bounded};
use crate::type_spec::TypeSpec;
use iio_common::consts::{MAX_CHANNELS, MAX_SCAN_INDEX, MAX_SENSORS, MAX_SENSOR_REPORT_SIZE};
use iio_common::sysfs::{AttributeStore, IioPaths};
use tracing::{debug, error, info, warn};

const MAX_SLOTS: usize = MAX_SENSORS * MAX_CHANNELS;

/// An enabled channel waiting for its offset.
#[derive(Debug, Clone, Copy)]
struct Slot {
    index: u32,
    sensor: SensorId,
    channel: usize,
    size: usize,
}

/// Recompute offset and size of every channel of every sensor on `dev`.
///
/// Returns the total size of the combined device report. Unreadable,
/// malformed or out-of-range channels are logged and left out of the
/// report with size 0, as are channels that would overflow their sensor's
/// report buffer.
pub fn resolve_layout(
    table: &mut SensorTable,
    store: &dyn AttributeStore,
    paths: &IioPaths,
    dev: DeviceId,
) -> usize {
    let mut slots: heapless::Vec<Slot, MAX_SLOTS> = heapless::Vec::new();

    for id in 0..table.len() {
        let Some(sensor) = table.sensor_mut(id) else {
            continue;
        };
        if sensor.dev != dev {
            continue;
        }
        let catalog = sensor.catalog;

        for (c, channel) in sensor.channels.iter_mut().enumerate() {
            channel.offset = 0;
            channel.size = 0;

            let Some(stem) = catalog.channels.get(c) else {
                continue;
            };

            let en_path = paths.scan_element(dev, &stem.en_attr());
            match store.read_int(&en_path) {
                Ok(flag) => channel.enabled = flag != 0,
                Err(e) => {
                    warn!("Failed to read _en flag: {}", e);
                    channel.enabled = false;
                    continue;
                }
            }

            let type_path = paths.scan_element(dev, &stem.type_attr());
            let spec = match store.read_string(&type_path) {
                Ok(spec) => spec,
                Err(e) => {
                    warn!("Failed to read type: {}", e);
                    continue;
                }
            };
            channel.type_spec = bounded(&spec);
            channel.type_info = TypeSpec::parse(&spec);

            let index_path = paths.scan_element(dev, &stem.index_attr());
            let index = match store.read_int(&index_path) {
                Ok(index) => index,
                Err(e) => {
                    warn!("Failed to read index: {}", e);
                    continue;
                }
            };

            if index < 0 || index >= i64::from(MAX_SCAN_INDEX) {
                error!("Index out of bounds ({}): {:?}", index, index_path);
                continue;
            }

            if !channel.enabled {
                continue;
            }

            let Some(type_info) = channel.type_info else {
                warn!("Malformed type {:?} for {}", spec, stem.0);
                continue;
            };

            let slot = Slot {
                index: index as u32,
                sensor: id,
                channel: c,
                size: type_info.size(),
            };
            if slots.push(slot).is_err() {
                error!("Too many channels on iio device {}", dev);
            }
        }
    }

    info!("Found {} enabled channels for iio device {}", slots.len(), dev);

    slots.sort_by_key(|slot| slot.index);

    let mut offset = 0;
    let mut last_index = None;
    let mut sensor_bytes = [0usize; MAX_SENSORS];
    for slot in &slots {
        if last_index == Some(slot.index) {
            warn!(
                "S{} C{} shares scan index {}, dropped from the report",
                slot.sensor, slot.channel, slot.index
            );
            continue;
        }
        last_index = Some(slot.index);

        let Some(used) = sensor_bytes.get_mut(slot.sensor) else {
            continue;
        };
        if *used + slot.size > MAX_SENSOR_REPORT_SIZE {
            error!(
                "S{} C{} needs {} bytes, sensor report holds {} ({} used), dropped from the report",
                slot.sensor, slot.channel, slot.size, MAX_SENSOR_REPORT_SIZE, used
            );
            continue;
        }

        let Some(channel) = table
            .sensor_mut(slot.sensor)
            .and_then(|s| s.channels.get_mut(slot.channel))
        else {
            continue;
        };

        debug!(
            "S{} C{} : offset {}, size {}, type {}",
            slot.sensor, slot.channel, offset, slot.size, channel.type_spec
        );
        channel.offset = offset;
        channel.size = slot.size;
        offset += slot.size;
        *used += slot.size;
    }

    offset
}
