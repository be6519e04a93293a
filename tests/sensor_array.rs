use jsn_sr04t_array::{
    gpio::mock::MockPulseHal,
    sensors::{CalibrationError, UltrasoundConfig, default_pin_map},
    JsnSr04tArray, Reading, SensorId, UltrasoundError,
};

const EPS: f32 = 1e-4;

#[test]
fn calibrate_then_measure_one_sensor() -> Result<(), UltrasoundError> {
    let mut hal = MockPulseHal::new();
    hal.push_echoes(2, [Some(1160); 100]).push_echo(2, Some(1160));
    let config = UltrasoundConfig::default()
        .with_calibration_samples(100)
        .with_detection_rate(0.15);
    let mut sensors = JsnSr04tArray::new(hal, default_pin_map(), config)?;

    sensors.init()?;
    let calibration = sensors.calibrate(SensorId::SENSOR1)?;
    let reading = sensors.get_distance(SensorId::SENSOR1)?;

    assert_eq!(calibration.baseline, 20);
    assert_eq!(reading, Reading::Fresh(20));
    let (upper, lower) = sensors.thresholds(SensorId::SENSOR1)?.expect("sensor 1 is calibrated");
    assert!((upper - 23.0).abs() < EPS);
    assert!((lower - 17.0).abs() < EPS);
    // 101 ranging cycles, each followed by the settle delay, after the init delay
    assert_eq!(sensors.hal().trigger_count(3), 101);
    assert_eq!(sensors.hal().slept_milliseconds(), 20 + 101 * 50);
    assert_eq!(sensors.hal().pending_echoes(2), 0);
    Ok(())
}

#[test]
fn calibrate_all_reports_the_silent_sensor() -> Result<(), UltrasoundError> {
    let mut hal = MockPulseHal::new();
    hal.set_steady_echo(2, Some(1160))
        .set_steady_echo(6, Some(1740))
        .set_steady_echo(8, Some(2320));
    let mut sensors = JsnSr04tArray::with_defaults(hal)?;
    sensors.init()?;

    let report = sensors.calibrate_all()?;

    assert_eq!(
        report.failed().collect::<Vec<_>>(),
        vec![(SensorId::SENSOR2, CalibrationError::CalibrationFailed(SensorId::SENSOR2))]
    );
    assert_eq!(sensors.calibration(SensorId::SENSOR2)?, None);
    for (id, baseline) in [(SensorId::SENSOR1, 20), (SensorId::SENSOR3, 30), (SensorId::SENSOR4, 40)] {
        let calibration = sensors.calibration(id)?.expect("sensor calibrated");
        assert_eq!(calibration.baseline, baseline);
    }
    Ok(())
}

#[test]
fn stale_reading_survives_timeouts() -> Result<(), UltrasoundError> {
    let mut hal = MockPulseHal::new();
    hal.push_echoes(4, [Some(870), None, None]);
    let mut sensors = JsnSr04tArray::with_defaults(hal)?;
    sensors.init()?;

    assert_eq!(sensors.get_distance(SensorId::SENSOR2)?, Reading::Fresh(15));
    assert_eq!(sensors.get_distance(SensorId::SENSOR2)?, Reading::Stale(15));
    assert_eq!(sensors.get_distance(SensorId::SENSOR2)?, Reading::Stale(15));
    assert_eq!(sensors.get_distance(SensorId::SENSOR1)?, Reading::NoReading);
    Ok(())
}

#[test]
fn unknown_sensor_is_an_error_everywhere() -> Result<(), UltrasoundError> {
    let mut sensors = JsnSr04tArray::with_defaults(MockPulseHal::new())?;
    sensors.init()?;
    let id = SensorId::new(5);

    assert!(matches!(
        sensors.calibrate(id).map_err(UltrasoundError::from),
        Err(UltrasoundError::Calibration(CalibrationError::InvalidSensor(_)))
    ));
    assert!(sensors.get_distance(id).is_err());
    assert!(sensors.calibration(id).is_err());
    assert_eq!(sensors.sensor_ids().count(), 4);
    Ok(())
}
