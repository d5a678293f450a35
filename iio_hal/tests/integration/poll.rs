//! Integration test: poll-mode timing and rate control.

use super::fixture::FakeIio;
use iio_common::error::HalError;
use iio_hal::{SensorEvent, SensorType};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

fn pressure(fake: &FakeIio) {
    fake.add_device(2, "baro");
    fake.write_attr(2, "in_pressure_raw", "98");
    fake.write_attr(2, "in_pressure_sampling_frequency", "1");
}

#[test]
fn test_ten_hz_poll_sensor_second_poll_blocks() {
    let fake = FakeIio::new();
    pressure(&fake);
    let mut hal = fake.hal();

    hal.set_sample_rate(0, 100_000_000).unwrap();
    hal.activate(0, true).unwrap();
    assert_eq!(fake.read_attr(2, "in_pressure_sampling_frequency"), "10");

    let mut out = [SensorEvent::default()];
    assert_eq!(hal.poll(&mut out).unwrap(), 1);
    assert_eq!(out[0].sensor_type, SensorType::Pressure);
    assert_eq!(out[0].values(), &[980.0]);

    let start = Instant::now();
    assert_eq!(hal.poll(&mut out).unwrap(), 1);
    let waited = start.elapsed();
    assert!(waited >= Duration::from_millis(85), "{waited:?}");
    assert!(waited < Duration::from_millis(500), "{waited:?}");
}

#[test]
fn test_samples_spaced_by_min_interval_at_high_rate() {
    let fake = FakeIio::new();
    pressure(&fake);
    let mut hal = fake.hal();

    // 1 kHz requested; the 10 ms minimum interval dominates.
    hal.set_sample_rate(0, 1_000_000).unwrap();
    hal.activate(0, true).unwrap();

    let mut out = [SensorEvent::default()];
    let mut timestamps = Vec::new();
    for _ in 0..4 {
        assert_eq!(hal.poll(&mut out).unwrap(), 1);
        timestamps.push(out[0].timestamp);
    }

    for pair in timestamps.windows(2) {
        let spacing = pair[1] - pair[0];
        assert!(spacing >= 9_000_000, "spacing {spacing} ns");
    }
}

#[test]
fn test_zero_period_rejected_rate_unchanged() {
    let fake = FakeIio::new();
    pressure(&fake);
    let mut hal = fake.hal();

    hal.set_sample_rate(0, 200_000_000).unwrap();
    assert_eq!(hal.sensor(0).unwrap().sampling_rate, 5);

    let err = hal.set_sample_rate(0, 0).unwrap_err();
    assert!(matches!(err, HalError::InvalidArgument(_)));
    assert_eq!(hal.sensor(0).unwrap().sampling_rate, 5);
    assert_eq!(fake.read_attr(2, "in_pressure_sampling_frequency"), "5");
}

#[test]
fn test_disabled_poll_sensor_stops_reporting() {
    let fake = FakeIio::new();
    pressure(&fake);
    let mut hal = fake.hal();

    hal.set_sample_rate(0, 100_000_000).unwrap();
    hal.activate(0, true).unwrap();

    let mut out = [SensorEvent::default()];
    assert_eq!(hal.poll(&mut out).unwrap(), 1);

    hal.activate(0, false).unwrap();
    assert!(!hal.device(2).unwrap().is_open());

    // Nothing left to wait for: only a stop request ends the poll.
    let stop = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&stop);
    let waker = hal.waker();
    let handle = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(150));
        flag.store(true, Ordering::SeqCst);
        waker.wake();
    });
    let start = Instant::now();
    let stopped = hal.poll_with(&mut out, || stop.load(Ordering::SeqCst));
    assert_eq!(stopped.unwrap(), 0);
    assert!(start.elapsed() >= Duration::from_millis(100));
    handle.join().unwrap();
}
