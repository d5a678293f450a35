//! Event construction from a pending sensor report.

use crate::catalog::SensorOps;
use crate::core::SensorHal;
use crate::table::SensorId;
use iio_common::clock::monotonic_ns;
use iio_common::event::SensorEvent;
use tracing::{error, trace};

impl SensorHal {
    /// Build the event for sensor `s` and record the sample time.
    ///
    /// Poll-mode sensors are read straight from sysfs; event-driven sensors
    /// decode their report buffer field by field.
    pub(crate) fn propagate(&mut self, s: SensorId) -> SensorEvent {
        let now = monotonic_ns();
        let Some(sensor) = self.table.sensor_mut(s) else {
            return SensorEvent::default();
        };
        sensor.last_sample_ns = now;
        let sensor = &*sensor;

        let catalog = sensor.catalog;
        let mut event = SensorEvent::new(s, catalog.sensor_type, now);

        let fields = match catalog.sensor_type.field_count() {
            Some(fields) => fields.min(event.data.len()),
            None => {
                error!("Unknown sensor type {:?} on sensor {}", catalog.sensor_type, s);
                0
            }
        };

        trace!("Sample on sensor {} (type {:?})", s, catalog.sensor_type);

        let ops = catalog.kind;
        if sensor.is_poll_mode() {
            for field in 0..fields {
                event.data[field] =
                    ops.acquire_immediate_value(sensor, field, self.store.as_ref(), &self.paths);
            }
        } else {
            let mut cursor = 0;
            for field in 0..fields {
                let raw = sensor.report_buffer.get(cursor..).unwrap_or_default();
                event.data[field] = ops.transform(sensor, field, raw);
                cursor += sensor.channels.get(field).map_or(0, |c| c.size);
            }
        }

        ops.finalize(sensor, &mut event);
        event
    }
}
