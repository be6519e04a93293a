use log::{debug, error, info};
use thiserror::Error;

use crate::gpio::{HalError, PinMode, PulseHal};
use super::{
    default_pin_map, CalibrationEngine, CalibrationError, CalibrationReport, CalibrationState, ConfigError, Distance,
    DistanceConverter, InvalidSensor, PinAssignment, PulseTransceiver, SensorId, SensorRegistry, UltrasoundConfig,
};

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitError {
    #[error("sensors are already initialized")]
    AlreadyInitialized,
    #[error("hardware error while initializing: {0}")]
    Hal(#[from] HalError),
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasurementError {
    #[error("{0} is not registered")]
    InvalidSensor(SensorId),
    #[error("sensors must be initialized before measuring")]
    NotInitialized,
    #[error("hardware error while measuring: {0}")]
    Hal(#[from] HalError),
}

impl From<InvalidSensor> for MeasurementError {
    fn from(err: InvalidSensor) -> Self {
        MeasurementError::InvalidSensor(err.0)
    }
}

/// Result of a single measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reading {
    /// The echo came back and this is the new distance
    Fresh(Distance),
    /// The echo timed out, this is the last distance measured by the sensor
    Stale(Distance),
    /// The echo timed out and the sensor never measured anything
    NoReading,
}

impl Reading {
    pub fn distance(&self) -> Option<Distance> {
        match self {
            Reading::Fresh(distance) | Reading::Stale(distance) => Some(*distance),
            Reading::NoReading => None,
        }
    }

    pub fn is_fresh(&self) -> bool {
        matches!(self, Reading::Fresh(_))
    }
}

/// Array of JSN-SR04T waterproof ultrasonic sensors, each on its own trigger and echo pins.
///
/// Every operation blocks until the sensor answers or times out, and only one ranging cycle is
/// in flight at a time. Callers sharing the array between contexts must serialize access to it,
/// since pulses from neighbouring sensors can be heard by each other.
///
/// # Example
///
/// ```ignore
/// let mut sensors = JsnSr04tArray::with_defaults(hal)?;
/// sensors.init()?;
/// sensors.calibrate_all()?;
/// let reading = sensors.get_distance(SensorId::SENSOR1)?;
/// ```
pub struct JsnSr04tArray<H: PulseHal> {
    hal: H,
    registry: SensorRegistry,
    config: UltrasoundConfig,
    converter: DistanceConverter,
    transceiver: PulseTransceiver,
    calibration: CalibrationEngine,
    initialized: bool,
}

impl<H: PulseHal> JsnSr04tArray<H> {
    /// Creates a new sensor array. No pin is touched until [JsnSr04tArray::init] is called.
    ///
    /// # Arguments
    ///
    /// - `hal`: The platform the sensors are wired to.
    /// - `pin_map`: Trigger and echo pins of every sensor.
    /// - `config`: Timing and calibration constants.
    ///
    /// # Returns
    ///
    /// A `ConfigError` if the configuration is invalid or the pin map is empty, repeats a sensor
    /// or shares a pin between sensors.
    pub fn new<I>(hal: H, pin_map: I, config: UltrasoundConfig) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (SensorId, PinAssignment)>,
    {
        let calibration = CalibrationEngine::new(&config)?;
        let registry = SensorRegistry::new(pin_map)?;
        Ok(JsnSr04tArray {
            hal,
            registry,
            config,
            converter: DistanceConverter::new(config.speed_of_sound_divisor)?,
            transceiver: PulseTransceiver::new(&config),
            calibration,
            initialized: false,
        })
    }

    /// Creates the four sensor array of the reference board with the default configuration
    pub fn with_defaults(hal: H) -> Result<Self, ConfigError> {
        Self::new(hal, default_pin_map(), UltrasoundConfig::default())
    }

    /// Configures the pins of every sensor and waits for the boards to settle. Must be called
    /// once before calibrating or measuring.
    pub fn init(&mut self) -> Result<(), InitError> {
        if self.initialized {
            return Err(InitError::AlreadyInitialized);
        }

        info!("Initializing sensors...");
        for (_, pins) in self.registry.pin_assignments() {
            self.hal.set_pin_mode(pins.echo_pin, PinMode::InputPullUp)?;
            self.hal.set_pin_mode(pins.trigger_pin, PinMode::Output)?;
        }
        self.hal.sleep_milliseconds(self.config.init_settle_ms);
        self.initialized = true;
        info!("Initialization complete.");
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Calibrates one sensor against whatever it currently sees, see [CalibrationEngine::calibrate]
    pub fn calibrate(&mut self, id: SensorId) -> Result<CalibrationState, CalibrationError> {
        if !self.registry.contains(id) {
            error!("Can't calibrate {}: invalid sensor number.", id);
            return Err(CalibrationError::InvalidSensor(id));
        }
        if !self.initialized {
            return Err(CalibrationError::NotInitialized);
        }
        self.calibration.calibrate(&mut self.hal, &mut self.registry, id)
    }

    /// Calibrates every sensor in ascending id order, going on after failures
    ///
    /// # Returns
    ///
    /// The outcome of every sensor, or `NotInitialized` if nothing could be attempted
    pub fn calibrate_all(&mut self) -> Result<CalibrationReport, CalibrationError> {
        if !self.initialized {
            return Err(CalibrationError::NotInitialized);
        }
        let report = self.calibration.calibrate_all(&mut self.hal, &mut self.registry);
        for (id, err) in report.failed() {
            error!("{} was not calibrated: {}", id, err);
        }
        Ok(report)
    }

    /// Runs one ranging cycle on a sensor and waits the settle delay before returning.
    ///
    /// Calibration is not required, it only affects the thresholds.
    ///
    /// # Returns
    ///
    /// A [Reading]. A timed out echo never produces a zero distance: the last distance is
    /// returned as [Reading::Stale], or [Reading::NoReading] if there is none.
    pub fn get_distance(&mut self, id: SensorId) -> Result<Reading, MeasurementError> {
        let pins = self.registry.pin_assignment(id).map_err(|err| {
            error!("Can't get distance: {}", err);
            MeasurementError::from(err)
        })?;
        if !self.initialized {
            return Err(MeasurementError::NotInitialized);
        }

        let raw = self.transceiver.fire(&mut self.hal, pins)?;
        let reading = match self.converter.to_distance(raw) {
            Some(distance) => {
                self.registry.set_last_distance(id, distance)?;
                Reading::Fresh(distance)
            }
            None => {
                debug!("{}: echo timeout", id);
                match self.registry.get_last_distance(id)? {
                    Some(distance) => Reading::Stale(distance),
                    None => Reading::NoReading,
                }
            }
        };
        self.hal.sleep_milliseconds(self.config.settle_delay_ms);
        Ok(reading)
    }

    pub fn calibration(&self, id: SensorId) -> Result<Option<CalibrationState>, InvalidSensor> {
        self.registry.get_calibration(id)
    }

    /// Returns `(upper_threshold, lower_threshold)` of a calibrated sensor
    pub fn thresholds(&self, id: SensorId) -> Result<Option<(f32, f32)>, InvalidSensor> {
        Ok(self.registry.get_calibration(id)?.map(|calibration| calibration.thresholds()))
    }

    pub fn last_distance(&self, id: SensorId) -> Result<Option<Distance>, InvalidSensor> {
        self.registry.get_last_distance(id)
    }

    pub fn sensor_ids(&self) -> impl Iterator<Item = SensorId> + '_ {
        self.registry.ids()
    }

    pub fn registry(&self) -> &SensorRegistry {
        &self.registry
    }

    pub fn config(&self) -> &UltrasoundConfig {
        &self.config
    }

    pub fn hal(&self) -> &H {
        &self.hal
    }

    /// Gives the platform back
    pub fn release(self) -> H {
        self.hal
    }
}
