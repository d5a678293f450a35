//! Integration test: activation reference counting and descriptor lifecycle.

use super::fixture::FakeIio;
use iio_common::error::HalError;
use iio_hal::SensorHal;
use proptest::prelude::*;

/// One device backing an event-driven accelerometer and a poll-mode
/// temperature sensor.
fn accel_and_temp(fake: &FakeIio) {
    fake.add_device(0, "accel_temp");
    fake.add_scan_channel(0, "in_accel_x", "le:s16/16>>0", 0);
    fake.add_scan_channel(0, "in_accel_y", "le:s16/16>>0", 1);
    fake.add_scan_channel(0, "in_accel_z", "le:s16/16>>0", 2);
    fake.write_attr(0, "in_temp_raw", "25000");
}

/// Device state must follow the enable counts of its sensors.
fn assert_device_consistent(hal: &SensorHal) {
    let accel = hal.sensor(0).unwrap();
    let temp = hal.sensor(1).unwrap();
    let device = hal.device(0).unwrap();

    assert_eq!(device.trigger_sensors, u32::from(accel.is_enabled()));
    assert_eq!(device.poll_sensors, u32::from(temp.is_enabled()));
    assert_eq!(device.is_open(), accel.is_enabled() || temp.is_enabled());
    assert_eq!(device.registered, accel.is_enabled());
}

#[test]
fn test_discovery_of_mixed_device() {
    let fake = FakeIio::new();
    accel_and_temp(&fake);
    let hal = fake.hal();

    assert_eq!(hal.sensor_count(), 2);
    assert!(!hal.sensor(0).unwrap().is_poll_mode());
    assert!(hal.sensor(1).unwrap().is_poll_mode());
}

#[test]
fn test_poll_mode_open_then_event_driven_registers() {
    let fake = FakeIio::new();
    accel_and_temp(&fake);
    let mut hal = fake.hal();

    hal.activate(1, true).unwrap();
    let device = hal.device(0).unwrap();
    assert!(device.is_open());
    assert!(!device.registered);

    hal.activate(0, true).unwrap();
    assert!(hal.device(0).unwrap().registered);
    assert_eq!(fake.read_attr(0, "trigger/current_trigger"), "accel_temp-dev0");

    hal.activate(0, false).unwrap();
    let device = hal.device(0).unwrap();
    assert!(device.is_open());
    assert!(!device.registered);
    assert_eq!(fake.read_attr(0, "trigger/current_trigger"), "none");

    hal.activate(1, false).unwrap();
    assert!(!hal.device(0).unwrap().is_open());
    assert_device_consistent(&hal);
}

#[test]
fn test_spurious_disable_has_no_side_effect() {
    let fake = FakeIio::new();
    accel_and_temp(&fake);
    let mut hal = fake.hal();

    hal.activate(1, true).unwrap();
    assert_eq!(
        hal.activate(0, false),
        Err(HalError::SpuriousDisable { sensor: 0 })
    );
    assert!(hal.device(0).unwrap().is_open());
    assert_device_consistent(&hal);
}

#[test]
fn test_shutdown_releases_everything() {
    let fake = FakeIio::new();
    accel_and_temp(&fake);
    let mut hal = fake.hal();

    hal.activate(0, true).unwrap();
    hal.activate(0, true).unwrap();
    hal.activate(1, true).unwrap();
    hal.shutdown();

    assert_eq!(hal.sensor(0).unwrap().enable_count, 0);
    assert_eq!(hal.sensor(1).unwrap().enable_count, 0);
    assert!(!hal.device(0).unwrap().is_open());
    assert_eq!(fake.read_attr(0, "buffer/enable"), "0");
    assert_eq!(fake.read_attr(0, "scan_elements/in_accel_x_en"), "0");
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_enable_count_tracks_successful_requests(
        ops in proptest::collection::vec((0usize..2, any::<bool>()), 1..24),
    ) {
        let fake = FakeIio::new();
        accel_and_temp(&fake);
        let mut hal = fake.hal();
        let mut model = [0u32; 2];

        for (s, enabled) in ops {
            let result = hal.activate(s, enabled);
            if enabled {
                prop_assert!(result.is_ok());
                model[s] += 1;
            } else if model[s] == 0 {
                prop_assert_eq!(result, Err(HalError::SpuriousDisable { sensor: s }));
            } else {
                prop_assert!(result.is_ok());
                model[s] -= 1;
            }

            prop_assert_eq!(hal.sensor(s).unwrap().enable_count, model[s]);
            assert_device_consistent(&hal);
        }
    }
}
