//! IIO Common Library
//!
//! This crate provides shared constants, configuration loading, error types
//! and sysfs attribute access for the IIO sensor HAL.
//!
//! # Module Structure
//!
//! - [`consts`] - Table capacities and default paths
//! - [`config`] - Configuration loading traits and types
//! - [`error`] - `HalError` and `StoreError`
//! - [`event`] - Sensor types and the consumer-facing event record
//! - [`sysfs`] - Attribute store trait and sysfs path builder
//! - [`clock`] - Monotonic timestamps
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use iio_common::prelude::*;
//! ```

pub mod clock;
pub mod config;
pub mod consts;
pub mod error;
pub mod event;
pub mod prelude;
pub mod sysfs;
