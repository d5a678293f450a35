//! Device report integration.
//!
//! A readable device file holds one combined report covering every enabled
//! channel of every sensor on the device. Integration reads it and copies
//! each sensor's fields into that sensor's own buffer, packed back to back
//! in channel order.

use crate::core::SensorHal;
use crate::table::DeviceId;
use iio_common::consts::MAX_DEVICE_REPORT_SIZE;
use std::fs::File;
use std::io::Read;
use tracing::{debug, error, trace, warn};

impl SensorHal {
    /// Read and demultiplex the pending report of `dev`.
    ///
    /// Returns `true` if at least one enabled sensor got a new report.
    pub(crate) fn integrate(&mut self, dev: DeviceId) -> bool {
        if self.table.device(dev).is_none_or(|d| d.trigger_sensors == 0) {
            error!("Event reported on unexpected iio device {}", dev);
            return false;
        }

        let expected: usize = self
            .table
            .sensors()
            .iter()
            .filter(|s| s.dev == dev)
            .map(|s| s.report_size())
            .sum();

        if expected == 0 || expected > MAX_DEVICE_REPORT_SIZE {
            warn!("Unusable report size {} for iio device {}", expected, dev);
            return false;
        }

        let Some((device, sensors)) = self.table.device_and_sensors_mut(dev) else {
            return false;
        };
        let Some(file) = device.file.as_ref() else {
            error!("Report on closed iio device {}", dev);
            return false;
        };

        let mut buf = [0u8; MAX_DEVICE_REPORT_SIZE];
        let report = &mut buf[..expected];
        let len = match read_report(file, report) {
            Ok(0) => {
                debug!("No data on iio device {}", dev);
                return false;
            }
            Ok(len) => len,
            Err(e) => {
                error!("Could not read report from iio device {} ({})", dev, e);
                return false;
            }
        };

        if len < expected {
            warn!(
                "Short report from iio device {}: {} of {} bytes",
                dev, len, expected
            );
            return false;
        }

        trace!("Read {} bytes from iio device {}", len, dev);

        let mut integrated = false;
        for (s, sensor) in sensors.iter_mut().enumerate().filter(|(_, s)| s.dev == dev) {
            let mut cursor = 0;
            let mut complete = true;
            for channel in sensor.channels.iter() {
                let source = report.get(channel.offset..channel.offset + channel.size);
                let target = sensor.report_buffer.get_mut(cursor..cursor + channel.size);
                match (source, target) {
                    (Some(source), Some(target)) => target.copy_from_slice(source),
                    _ => {
                        warn!("Channel of sensor {} does not fit its buffers", s);
                        complete = false;
                        break;
                    }
                }
                cursor += channel.size;
            }

            if !complete {
                sensor.report_pending = false;
                continue;
            }

            if sensor.is_enabled() {
                trace!("Sensor {} report available ({} bytes)", s, cursor);
                sensor.report_pending = true;
                integrated = true;
            }
        }

        integrated
    }
}

fn read_report(mut file: &File, report: &mut [u8]) -> std::io::Result<usize> {
    file.read(report)
}
