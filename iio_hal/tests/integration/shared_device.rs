//! Integration test: two sensors multiplexed on one device.
//!
//! Ambient light (`le:u32/32>>0`, index 0) and proximity (`le:u16/16>>0`,
//! index 1) share `iio:device0`; each 6-byte report carries both.

use super::fixture::FakeIio;
use iio_hal::{SensorEvent, SensorType};
use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

fn als_prox(fake: &FakeIio) {
    fake.add_device(0, "als_prox");
    fake.add_scan_channel(0, "in_illuminance", "le:u32/32>>0", 0);
    fake.add_scan_channel(0, "in_proximity", "le:u16/16>>0", 1);
    fake.write_attr(0, "in_illuminance_scale", "0.5");
}

#[test]
fn test_combined_report_split_between_sensors() {
    let fake = FakeIio::new();
    als_prox(&fake);
    let mut hal = fake.hal();

    hal.activate(0, true).unwrap();
    hal.activate(1, true).unwrap();

    let light = &hal.sensor(0).unwrap().channels[0];
    assert_eq!((light.offset, light.size), (0, 4));
    let prox = &hal.sensor(1).unwrap().channels[0];
    assert_eq!((prox.offset, prox.size), (4, 2));
    assert_eq!(fake.read_attr(0, "buffer/enable"), "1");

    let mut writer = fake.writer(0);
    let mut report = Vec::new();
    report.extend_from_slice(&300u32.to_le_bytes());
    report.extend_from_slice(&7u16.to_le_bytes());
    writer.write_all(&report).unwrap();

    let mut out = [SensorEvent::default()];

    assert_eq!(hal.poll(&mut out).unwrap(), 1);
    assert_eq!(out[0].sensor, 0);
    assert_eq!(out[0].sensor_type, SensorType::Light);
    assert_eq!(out[0].values(), &[150.0]);

    // Second event comes from the same report, without waiting.
    assert_eq!(hal.poll(&mut out).unwrap(), 1);
    assert_eq!(out[0].sensor, 1);
    assert_eq!(out[0].sensor_type, SensorType::Proximity);
    assert_eq!(out[0].values(), &[7.0]);
}

#[test]
fn test_layout_shrinks_when_one_sensor_leaves() {
    let fake = FakeIio::new();
    als_prox(&fake);
    let mut hal = fake.hal();

    hal.activate(0, true).unwrap();
    hal.activate(1, true).unwrap();
    hal.activate(0, false).unwrap();

    assert_eq!(fake.read_attr(0, "scan_elements/in_illuminance_en"), "0");
    assert_eq!(hal.sensor(0).unwrap().channels[0].size, 0);
    let prox = &hal.sensor(1).unwrap().channels[0];
    assert_eq!((prox.offset, prox.size), (0, 2));

    let mut writer = fake.writer(0);
    writer.write_all(&42u16.to_le_bytes()).unwrap();

    let mut out = [SensorEvent::default()];
    assert_eq!(hal.poll(&mut out).unwrap(), 1);
    assert_eq!(out[0].sensor, 1);
    assert_eq!(out[0].values(), &[42.0]);
    assert!(!hal.sensor(0).unwrap().report_pending);
}

#[test]
fn test_out_of_range_index_left_out_of_report() {
    let fake = FakeIio::new();
    als_prox(&fake);
    fake.write_scan(0, "in_illuminance_index", "10");
    let mut hal = fake.hal();

    hal.activate(0, true).unwrap();
    hal.activate(1, true).unwrap();

    assert_eq!(hal.sensor(0).unwrap().channels[0].size, 0);
    let prox = &hal.sensor(1).unwrap().channels[0];
    assert_eq!((prox.offset, prox.size), (0, 2));
}

#[test]
fn test_oversized_channel_delivers_no_sample() {
    let fake = FakeIio::new();
    als_prox(&fake);
    fake.write_scan(0, "in_illuminance_type", "le:u64/64X8>>0");
    let mut hal = fake.hal();

    hal.activate(0, true).unwrap();
    assert_eq!(hal.sensor(0).unwrap().channels[0].size, 0);

    let mut writer = fake.writer(0);
    writer.write_all(&[0xAB; 64]).unwrap();

    // No sample can be built: only a stop request ends the poll.
    let stop = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&stop);
    let waker = hal.waker();
    let handle = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(100));
        flag.store(true, Ordering::SeqCst);
        waker.wake();
    });

    let mut out = [SensorEvent::default()];
    let delivered = hal.poll_with(&mut out, || stop.load(Ordering::SeqCst));
    handle.join().unwrap();

    assert_eq!(delivered.unwrap(), 0);
    assert!(!hal.sensor(0).unwrap().report_pending);
}
