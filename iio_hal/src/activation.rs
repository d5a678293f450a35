//! Sensor activation and sampling rate control.
//!
//! Consumers enable and disable sensors with reference counting: only the
//! 0→1 and 1→0 transitions of a sensor's enable count touch the hardware.
//! A transition updates the per-device counters, reconfigures the trigger,
//! channel enables and report layout of event-driven sensors, and keeps a
//! descriptor open on the device file for as long as any sensor of the
//! device is enabled. The driver is expected to power the hardware block
//! while someone holds that descriptor.
//!
//! # Device State
//!
//! ```text
//!   closed ──first enable──► open ──first event-driven enable──► open+registered
//!     ▲                        │                                        │
//!     └──last disable──────────┴◄──────last event-driven disable────────┘
//! ```

use crate::core::SensorHal;
use crate::layout::resolve_layout;
use crate::table::{DeviceId, SensorId};
use iio_common::clock::NS_PER_SEC;
use iio_common::error::HalError;
use std::fs::OpenOptions;
use std::os::unix::fs::OpenOptionsExt;
use tracing::{debug, error, info, warn};

impl SensorHal {
    /// Enable or disable a sensor on behalf of one consumer.
    ///
    /// # Errors
    /// - `InvalidHandle` for an unknown sensor
    /// - `SpuriousDisable` when disabling a sensor nobody enabled; nothing
    ///   is changed
    /// - `HardwareError` when the device file cannot be opened or watched;
    ///   the enable is rolled back
    pub fn activate(&mut self, s: SensorId, enabled: bool) -> Result<(), HalError> {
        let sensor = self.table.sensor(s).ok_or(HalError::InvalidHandle(s))?;
        let dev = sensor.dev;
        let event_driven = !sensor.is_poll_mode();

        if !self.adjust_counters(s, enabled)? {
            return Ok(());
        }

        if event_driven {
            self.configure_streaming(s, enabled);
        }

        if enabled {
            self.acquire_device(s)?;
        } else {
            self.release_device(dev);
        }

        // Let a blocked wait pick up the new timeout and wait set.
        self.poller.wake();
        Ok(())
    }

    /// Set a sensor's sampling period.
    ///
    /// The rate is `1e9 / period_ns` Hz, at least 1 Hz. The sysfs sampling
    /// frequency is only written when it can be read and differs.
    ///
    /// # Errors
    /// `InvalidArgument` if `period_ns <= 0`; the rate is left unchanged.
    pub fn set_sample_rate(&mut self, s: SensorId, period_ns: i64) -> Result<(), HalError> {
        let sensor = self.table.sensor(s).ok_or(HalError::InvalidHandle(s))?;

        if period_ns <= 0 {
            error!("Rejecting delay of {} ns on sensor {}", period_ns, s);
            return Err(HalError::InvalidArgument(format!(
                "sampling period must be positive, got {period_ns} ns"
            )));
        }

        let mut rate = NS_PER_SEC / period_ns;
        if rate == 0 {
            info!("Sub-Hz sampling rate requested on sensor {}", s);
            rate = 1;
        }
        let rate = u32::try_from(rate).unwrap_or(u32::MAX);

        let dev = sensor.dev;
        let path = self
            .paths
            .attribute(dev, &sensor.catalog.sampling_frequency_attr());

        match self.store.read_int(&path) {
            Ok(current) if current != i64::from(rate) => {
                info!("Sensor {} sampling rate set to {}", s, rate);

                let streaming = self.table.device(dev).is_some_and(|d| d.trigger_sensors > 0);
                if streaming {
                    self.enable_buffer(dev, false);
                }
                if let Err(e) = self.store.write_int(&path, i64::from(rate)) {
                    warn!("Failed to set sampling rate of sensor {}: {}", s, e);
                }
                if streaming {
                    self.enable_buffer(dev, true);
                }
            }
            Ok(_) => {}
            Err(e) => debug!("Sensor {} has no sampling frequency control: {}", s, e),
        }

        if let Some(sensor) = self.table.sensor_mut(s) {
            sensor.sampling_rate = rate;
        }

        self.poller.wake();
        Ok(())
    }

    /// Apply one enable or disable to the reference counts.
    ///
    /// Returns `true` when the sensor changed state and the device side
    /// needs work.
    fn adjust_counters(&mut self, s: SensorId, enabled: bool) -> Result<bool, HalError> {
        let sensor = self.table.sensor_mut(s).ok_or(HalError::InvalidHandle(s))?;
        let dev = sensor.dev;

        if enabled {
            info!(
                "Enabling sensor {} (iio device {}: {})",
                s,
                dev,
                sensor.friendly_name()
            );
            sensor.enable_count += 1;
            if sensor.enable_count != 1 {
                return Ok(false);
            }
        } else {
            if sensor.enable_count == 0 {
                error!("Spurious disable of sensor {}", s);
                return Err(HalError::SpuriousDisable { sensor: s });
            }

            info!(
                "Disabling sensor {} (iio device {}: {})",
                s,
                dev,
                sensor.friendly_name()
            );
            sensor.enable_count -= 1;
            if sensor.enable_count > 0 {
                return Ok(false);
            }

            sensor.report_pending = false;
            sensor.report_buffer.fill(0);
        }

        let poll_mode = sensor.is_poll_mode();
        if let Some(device) = self.table.device_mut(dev) {
            let counter = if poll_mode {
                &mut device.poll_sensors
            } else {
                &mut device.trigger_sensors
            };
            if enabled {
                *counter += 1;
            } else {
                *counter = counter.saturating_sub(1);
            }
        }

        Ok(true)
    }

    /// Reconfigure trigger, channels and layout of an event-driven sensor's
    /// device. Runs with the buffer disabled.
    fn configure_streaming(&mut self, s: SensorId, enabled: bool) {
        let Some(sensor) = self.table.sensor(s) else {
            return;
        };
        let dev = sensor.dev;
        let catalog = sensor.catalog;
        let trigger_name = sensor.trigger_name();
        let trigger_sensors = self.table.device(dev).map_or(0, |d| d.trigger_sensors);

        self.enable_buffer(dev, false);

        match (trigger_sensors, enabled) {
            (0, _) => self.setup_trigger(dev, "none"),
            (1, true) => self.setup_trigger(dev, &trigger_name),
            (_, true) => warn!(
                "Sensor {} joins the trigger already set on iio device {}, compatibility not checked",
                s, dev
            ),
            (_, false) => {}
        }

        for (c, stem) in catalog.channels.iter().enumerate() {
            let path = self.paths.scan_element(dev, &stem.en_attr());
            match self.store.write_int(&path, i64::from(enabled)) {
                Ok(()) => {
                    if let Some(channel) = self
                        .table
                        .sensor_mut(s)
                        .and_then(|sensor| sensor.channels.get_mut(c))
                    {
                        channel.enabled = enabled;
                    }
                }
                Err(e) => warn!("Failed to switch channel {}: {}", stem.0, e),
            }
        }

        if trigger_sensors > 0 {
            let size = resolve_layout(&mut self.table, self.store.as_ref(), &self.paths, dev);
            debug!("iio device {} report is {} bytes", dev, size);
            self.enable_buffer(dev, true);
        }
    }

    /// Make sure the device file of an enabled sensor is open, and watched
    /// if the sensor is event-driven. Rolls the enable back on failure.
    fn acquire_device(&mut self, s: SensorId) -> Result<(), HalError> {
        let Some(sensor) = self.table.sensor(s) else {
            return Err(HalError::InvalidHandle(s));
        };
        let dev = sensor.dev;
        let event_driven = !sensor.is_poll_mode();
        let path = self.paths.dev_file(dev);

        let Some(device) = self.table.device_mut(dev) else {
            return Err(HalError::InvalidHandle(s));
        };

        if device.file.is_none() {
            match OpenOptions::new()
                .read(true)
                .custom_flags(libc::O_NONBLOCK)
                .open(&path)
            {
                Ok(file) => {
                    debug!("Opened {:?}", path);
                    device.file = Some(file);
                }
                Err(e) => {
                    error!("Could not open {:?} ({})", path, e);
                    self.roll_back(s);
                    return Err(HalError::HardwareError(format!(
                        "cannot open {}: {e}",
                        path.display()
                    )));
                }
            }
        }

        if event_driven && !device.registered {
            let registered = match device.file.as_ref() {
                Some(file) => self.poller.register(file, dev),
                None => Ok(()),
            };
            match registered {
                Ok(()) => device.registered = true,
                Err(e) => {
                    error!("Failed adding iio device {} to the wait set ({})", dev, e);
                    self.roll_back(s);
                    return Err(HalError::HardwareError(format!(
                        "cannot watch {}: {e}",
                        path.display()
                    )));
                }
            }
        }

        Ok(())
    }

    /// Stop watching a device without event-driven users and close it once
    /// no sensor uses it.
    fn release_device(&mut self, dev: DeviceId) {
        let Some(device) = self.table.device_mut(dev) else {
            return;
        };

        if device.registered && device.trigger_sensors == 0 {
            if let Some(file) = device.file.as_ref() {
                if let Err(e) = self.poller.unregister(file) {
                    warn!("Failed removing iio device {} from the wait set ({})", dev, e);
                }
            }
            device.registered = false;
        }

        if !device.is_in_use() && device.file.take().is_some() {
            debug!("Closed iio device {}", dev);
        }
    }

    /// Undo an enable whose device could not be acquired.
    fn roll_back(&mut self, s: SensorId) {
        let Some(sensor) = self.table.sensor(s) else {
            return;
        };
        let dev = sensor.dev;
        let event_driven = !sensor.is_poll_mode();

        match self.adjust_counters(s, false) {
            Ok(true) if event_driven => self.configure_streaming(s, false),
            Ok(_) => {}
            Err(e) => warn!("Rollback of sensor {} failed: {}", s, e),
        }
        self.release_device(dev);
    }

    fn enable_buffer(&self, dev: DeviceId, enabled: bool) {
        let path = self.paths.buffer_enable(dev);
        if let Err(e) = self.store.write_int(&path, i64::from(enabled)) {
            warn!("Failed to switch buffer of iio device {}: {}", dev, e);
        }
    }

    fn setup_trigger(&self, dev: DeviceId, trigger: &str) {
        let path = self.paths.current_trigger(dev);
        if let Err(e) = self.store.write_string(&path, trigger) {
            warn!("Failed to set trigger {:?} on iio device {}: {}", trigger, dev, e);
        }
    }
}
