//! Event multiplexing loop.
//!
//! `poll` hands out pending reports one at a time, in discovery order, and
//! only blocks once none is left. The blocking wait covers the devices with
//! a streaming sensor plus the wake channel; its timeout is the time until
//! the next poll-mode sensor sample is due.
//!
//! # Cycle
//!
//! ```text
//! ┌──► pending report? ──yes──► propagate, clear flag, return 1
//! │         │ no
//! │         ▼
//! │    throttle (min interval since last wait)
//! │         ▼
//! │    wait(devices + wake, timeout)
//! │         ├── wake only ──► acknowledge, wait again (or return 0 on stop)
//! │         ├── device ready ──► integrate
//! │         ▼
//! └─── mark enabled poll-mode sensors pending
//! ```

use crate::core::SensorHal;
use crate::poller::Token;
use iio_common::clock::{NS_PER_SEC, monotonic_ns};
use iio_common::consts::MAX_DEVICES;
use iio_common::error::HalError;
use iio_common::event::SensorEvent;
use nix::sys::epoll::EpollEvent;
use std::time::{Duration, Instant};
use tracing::{debug, info, trace, warn};

impl SensorHal {
    /// Block until a sensor event is available and store it in `out[0]`.
    ///
    /// Returns the number of events written, always 1.
    ///
    /// # Errors
    /// `InvalidArgument` if `out` is empty.
    pub fn poll(&mut self, out: &mut [SensorEvent]) -> Result<usize, HalError> {
        self.poll_with(out, || false)
    }

    /// Like [`poll`](Self::poll), but returns 0 when the loop is woken while
    /// `should_stop` holds.
    pub fn poll_with(
        &mut self,
        out: &mut [SensorEvent],
        should_stop: impl Fn() -> bool,
    ) -> Result<usize, HalError> {
        let Some(slot) = out.first_mut() else {
            return Err(HalError::InvalidArgument(
                "event buffer is empty".to_string(),
            ));
        };

        loop {
            if let Some(s) = self.table.first_pending() {
                *slot = self.propagate(s);
                if let Some(sensor) = self.table.sensor_mut(s) {
                    sensor.report_pending = false;
                }
                trace!("Report on sensor {}", s);
                return Ok(1);
            }

            if !self.await_events(&should_stop) {
                return Ok(0);
            }
        }
    }

    /// Wait until some sensor may have a report. Returns `false` on a stop
    /// request.
    fn await_events(&mut self, should_stop: &impl Fn() -> bool) -> bool {
        let mut events = [EpollEvent::empty(); MAX_DEVICES + 1];

        loop {
            self.throttle();

            let timeout = self.next_timeout();
            trace!("Awaiting sensor data (timeout {:?})", timeout);

            let ready = self.poller.wait(&mut events, timeout);
            self.last_wait_exit = Some(Instant::now());

            let ready = match ready {
                Ok(ready) => ready,
                Err(e) => {
                    info!("Wait failed ({}), retrying", e);
                    continue;
                }
            };

            let mut woken = false;
            let mut device_events = 0;
            for readiness in ready {
                match readiness.token {
                    Token::Wake => woken = true,
                    Token::Device(dev) if readiness.readable => {
                        self.integrate(dev);
                        device_events += 1;
                    }
                    Token::Device(dev) if readiness.failed => {
                        warn!("Error condition on iio device {}", dev);
                    }
                    Token::Device(_) => {}
                }
            }

            if woken {
                self.poller.acknowledge();
                if should_stop() {
                    debug!("Stop requested while waiting");
                    return false;
                }
                if device_events == 0 {
                    continue;
                }
            }

            self.mark_poll_sensors_due();
            return true;
        }
    }

    /// Sleep out the rest of the minimum spacing between two waits.
    fn throttle(&self) {
        let Some(last_exit) = self.last_wait_exit else {
            return;
        };
        let elapsed = last_exit.elapsed();
        if elapsed < self.min_poll_interval {
            std::thread::sleep(self.min_poll_interval - elapsed);
        }
    }

    /// Time until the next poll-mode sample is due; `None` waits forever.
    fn next_timeout(&self) -> Option<Duration> {
        if self.table.active_poll_sensors() == 0 {
            return None;
        }

        let due = self
            .table
            .sensors()
            .iter()
            .filter(|s| s.is_enabled() && s.is_poll_mode() && s.sampling_rate > 0)
            .map(|s| s.last_sample_ns + NS_PER_SEC / i64::from(s.sampling_rate))
            .min()?;

        let remaining = due - monotonic_ns();
        Some(Duration::from_nanos(remaining.max(0) as u64))
    }

    fn mark_poll_sensors_due(&mut self) {
        if self.table.active_poll_sensors() == 0 {
            return;
        }
        for s in 0..self.table.len() {
            if let Some(sensor) = self.table.sensor_mut(s) {
                if sensor.is_enabled() && sensor.is_poll_mode() {
                    sensor.report_pending = true;
                }
            }
        }
    }
}
