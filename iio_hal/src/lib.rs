//! # IIO Sensor HAL Library
//!
//! Multiplexes the sensors exposed by the Linux IIO subsystem into a single
//! pull-based event stream.
//!
//! A kernel device (`iio:deviceN`) may back several logical sensors. Sensors
//! are either event-driven (binary reports pushed through the readable
//! device file, one combined report per device) or poll-mode (no buffer,
//! sampled from sysfs on a timer).
//!
//! # Module Structure
//!
//! - [`core`] - SensorHal struct, construction and shutdown
//! - [`activation`] - Reference-counted enable/disable, sampling rate
//! - [`layout`] - Channel offsets inside a combined device report
//! - [`integrate`] - Device report demultiplexing
//! - [`propagate`] - Event construction
//! - [`poll_loop`] - Blocking `poll` over devices and timers
//! - [`poller`] - epoll wait set with an eventfd wake channel
//! - [`discovery`] - Sensor table construction from sysfs
//! - [`catalog`] - Supported sensor types and sample conversion
//! - [`table`] - Sensor and device records
//! - [`type_spec`] - Scan element type descriptors
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                            SensorHal                             │
//! │  activate ──► counters ──► trigger / _en ──► layout ──► buffer   │
//! │      │                                                           │
//! │      └──► open / register ──► Poller (epoll + eventfd) ◄── Waker │
//! │                                   │                              │
//! │  poll ◄── propagate ◄── pending ◄─┴─ integrate / poll-mode due   │
//! └──────────────────────────────────────────────────────────────────┘
//! ```

#![warn(missing_docs)]

pub mod activation;
pub mod catalog;
pub mod core;
pub mod discovery;
pub mod integrate;
pub mod layout;
pub mod poll_loop;
pub mod poller;
pub mod propagate;
pub mod table;
pub mod type_spec;

#[cfg(test)]
mod test_support;

// Re-export key types for convenience
pub use crate::catalog::{CATALOG, CatalogEntry, SensorKind, SensorOps};
pub use crate::core::SensorHal;
pub use crate::poller::Waker;
pub use crate::table::{DeviceId, SensorId};
pub use iio_common::event::{SensorEvent, SensorType};
