//! Sensor discovery.
//!
//! Probes `iio:device0..MAX_DEVICES` and matches every catalog entry against
//! the attributes each device exposes. A sensor whose first channel has a
//! scan element is event-driven; one that only exposes `<channel>_raw` is
//! sampled in poll mode.

use crate::catalog::CATALOG;
use crate::table::{Sensor, SensorTable};
use iio_common::consts::MAX_DEVICES;
use iio_common::sysfs::{AttributeStore, IioPaths};
use std::path::Path;
use tracing::{debug, info, warn};

/// Build the sensor table from the IIO hierarchy.
pub fn discover(store: &dyn AttributeStore, paths: &IioPaths) -> SensorTable {
    let mut table = SensorTable::new();

    for dev in 0..MAX_DEVICES {
        if !store.exists(&paths.device_dir(dev)) {
            continue;
        }

        let name = match store.read_string(&paths.name(dev)) {
            Ok(name) => name,
            Err(e) => {
                warn!("Skipping iio device {}: {}", dev, e);
                continue;
            }
        };
        debug!("Probing iio device {} ({})", dev, name);

        for entry in CATALOG.iter() {
            let Some(first) = entry.channels.first() else {
                continue;
            };

            let event_driven = if store.exists(&paths.scan_element(dev, &first.en_attr())) {
                true
            } else if store.exists(&paths.attribute(dev, &first.raw_attr())) {
                false
            } else {
                continue;
            };

            let mut sensor = Sensor::new(entry, dev, &name, event_driven);
            sensor.scale = read_calibration(store, &paths.attribute(dev, &entry.scale_attr()), 1.0);
            sensor.offset =
                read_calibration(store, &paths.attribute(dev, &entry.offset_attr()), 0.0);

            match table.push(sensor) {
                Ok(id) => info!(
                    "Sensor {}: {} on iio device {} ({})",
                    id,
                    entry.friendly_name,
                    dev,
                    if event_driven { "event-driven" } else { "poll-mode" }
                ),
                Err(sensor) => {
                    warn!(
                        "Sensor table full, ignoring {} on iio device {}",
                        sensor.friendly_name(),
                        dev
                    );
                    return table;
                }
            }
        }
    }

    info!("Discovered {} sensors", table.len());
    table
}

fn read_calibration(store: &dyn AttributeStore, path: &Path, default: f64) -> f64 {
    match store.read_float(path) {
        Ok(value) => value,
        Err(e) => {
            debug!("Using {} for {:?}: {}", default, path, e);
            default
        }
    }
}
