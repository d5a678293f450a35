//! SensorHal struct and lifecycle management.
//!
//! The `SensorHal` owns everything the multiplexer needs: the sensor and
//! device tables, the attribute store, the wait set and the poll timing
//! state. Operations are split across modules by concern:
//!
//! - [`crate::activation`] - `activate` and `set_sample_rate`
//! - [`crate::integrate`] - device report demultiplexing
//! - [`crate::propagate`] - event construction
//! - [`crate::poll_loop`] - `poll` and `poll_with`
//!
//! All of them run on the thread that owns the `SensorHal`. Other threads
//! only get a [`Waker`].

use crate::catalog::{SensorKind, find_by_tag};
use crate::discovery::discover;
use crate::poller::{Poller, Waker};
use crate::table::{Device, DeviceId, Sensor, SensorId, SensorTable};
use iio_common::config::HalConfig;
use iio_common::error::HalError;
use iio_common::sysfs::{AttributeStore, IioPaths, SysfsStore};
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Sensor multiplexing HAL.
pub struct SensorHal {
    /// Configuration
    pub(crate) config: HalConfig,
    /// Attribute and device file locations
    pub(crate) paths: IioPaths,
    /// Attribute access
    pub(crate) store: Box<dyn AttributeStore>,
    /// Sensor and device tables
    pub(crate) table: SensorTable,
    /// Wait set and wake channel
    pub(crate) poller: Poller,
    /// Minimum spacing between two waits
    pub(crate) min_poll_interval: Duration,
    /// Moment the previous wait returned
    pub(crate) last_wait_exit: Option<Instant>,
}

impl SensorHal {
    /// Create a HAL over the configured sysfs hierarchy.
    ///
    /// # Errors
    /// Returns `ConfigError` if validation fails and `InitFailed` if the
    /// wait set or wake channel cannot be created.
    pub fn new(config: HalConfig) -> Result<Self, HalError> {
        Self::with_store(config, Box::new(SysfsStore::new()))
    }

    /// Create a HAL reading attributes through `store`.
    pub fn with_store(config: HalConfig, store: Box<dyn AttributeStore>) -> Result<Self, HalError> {
        config
            .validate()
            .map_err(|e| HalError::ConfigError(e.to_string()))?;

        let poller = Poller::new()?;
        let paths = config.iio_paths();
        let table = discover(store.as_ref(), &paths);
        let min_poll_interval = config.min_poll_interval();

        info!(
            "SensorHal '{}' created with {} sensors, min poll interval {}us",
            config.shared.service_name,
            table.len(),
            min_poll_interval.as_micros()
        );

        Ok(Self {
            config,
            paths,
            store,
            table,
            poller,
            min_poll_interval,
            last_wait_exit: None,
        })
    }

    /// Get the configuration.
    pub fn config(&self) -> &HalConfig {
        &self.config
    }

    /// Number of discovered sensors.
    pub fn sensor_count(&self) -> usize {
        self.table.len()
    }

    /// All sensors, indexed by handle.
    pub fn sensors(&self) -> &[Sensor] {
        self.table.sensors()
    }

    /// Sensor by handle.
    pub fn sensor(&self, s: SensorId) -> Option<&Sensor> {
        self.table.sensor(s)
    }

    /// Device by number.
    pub fn device(&self, dev: DeviceId) -> Option<&Device> {
        self.table.device(dev)
    }

    /// Handles of every sensor of a kind, in discovery order.
    pub fn find(&self, kind: SensorKind) -> impl Iterator<Item = SensorId> + '_ {
        self.table
            .sensors()
            .iter()
            .enumerate()
            .filter(move |(_, s)| s.catalog.kind == kind)
            .map(|(id, _)| id)
    }

    /// Handles matching a catalog tag (`accel`) or a friendly name
    /// (`Ambient Light`), ignoring case.
    pub fn lookup(&self, name: &str) -> Vec<SensorId> {
        match find_by_tag(&name.to_ascii_lowercase()) {
            Some(entry) => self.find(entry.kind).collect(),
            None => self
                .table
                .sensors()
                .iter()
                .enumerate()
                .filter(|(_, s)| s.friendly_name().eq_ignore_ascii_case(name))
                .map(|(id, _)| id)
                .collect(),
        }
    }

    /// Handle interrupting a blocked `poll` from another thread.
    pub fn waker(&self) -> Waker {
        self.poller.waker()
    }

    /// Deactivate every sensor, closing all device files.
    pub fn shutdown(&mut self) {
        let mut released = 0;
        for s in 0..self.table.len() {
            while self.table.sensor(s).is_some_and(Sensor::is_enabled) {
                if let Err(e) = self.activate(s, false) {
                    warn!("Failed to deactivate sensor {}: {}", s, e);
                    break;
                }
                released += 1;
            }
        }
        if released > 0 {
            info!("SensorHal shut down, {} activations released", released);
        }
    }
}

impl Drop for SensorHal {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for SensorHal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SensorHal")
            .field("paths", &self.paths)
            .field("table", &self.table)
            .field("min_poll_interval", &self.min_poll_interval)
            .finish_non_exhaustive()
    }
}
