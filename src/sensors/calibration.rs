use log::{debug, info, warn};
use thiserror::Error;

use crate::gpio::{HalError, PulseHal};
use super::{ConfigError, Distance, DistanceConverter, InvalidSensor, PulseTransceiver, SensorId, SensorRegistry, UltrasoundConfig};

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationError {
    #[error("{0} is not registered")]
    InvalidSensor(SensorId),
    #[error("{0} averaged a zero baseline")]
    CalibrationFailed(SensorId),
    #[error("sensors must be initialized before calibrating")]
    NotInitialized,
    #[error("hardware error while calibrating: {0}")]
    Hal(#[from] HalError),
}

impl From<InvalidSensor> for CalibrationError {
    fn from(err: InvalidSensor) -> Self {
        CalibrationError::InvalidSensor(err.0)
    }
}

/// Resting distance of a sensor and the detection band derived from it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationState {
    pub baseline: Distance,
    pub upper_threshold: f32,
    pub lower_threshold: f32,
}

impl CalibrationState {
    /// Derives the band `baseline * (1 ± detection_rate)`
    pub fn from_baseline(baseline: Distance, detection_rate: f32) -> Self {
        let baseline_f = baseline as f32;
        CalibrationState {
            baseline,
            upper_threshold: baseline_f * (1.0 + detection_rate),
            lower_threshold: baseline_f * (1.0 - detection_rate),
        }
    }

    /// Returns `(upper_threshold, lower_threshold)`
    pub fn thresholds(&self) -> (f32, f32) {
        (self.upper_threshold, self.lower_threshold)
    }
}

/// Outcome of calibrating every registered sensor, in ascending id order
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationReport {
    outcomes: Vec<(SensorId, Result<CalibrationState, CalibrationError>)>,
}

impl CalibrationReport {
    pub fn outcomes(&self) -> &[(SensorId, Result<CalibrationState, CalibrationError>)] {
        &self.outcomes
    }

    pub fn outcome(&self, id: SensorId) -> Option<&Result<CalibrationState, CalibrationError>> {
        self.outcomes.iter().find(|(sensor, _)| *sensor == id).map(|(_, outcome)| outcome)
    }

    /// Ids of the sensors that calibrated
    pub fn succeeded(&self) -> impl Iterator<Item = SensorId> + '_ {
        self.outcomes.iter().filter(|(_, outcome)| outcome.is_ok()).map(|(id, _)| *id)
    }

    /// Sensors that could not be calibrated, along with the reason
    pub fn failed(&self) -> impl Iterator<Item = (SensorId, CalibrationError)> + '_ {
        self.outcomes.iter().filter_map(|(id, outcome)| outcome.as_ref().err().map(|err| (*id, *err)))
    }

    /// True if every sensor calibrated
    pub fn is_complete(&self) -> bool {
        self.outcomes.iter().all(|(_, outcome)| outcome.is_ok())
    }
}

/// Averages a burst of readings into a baseline and stores the derived thresholds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationEngine {
    converter: DistanceConverter,
    transceiver: PulseTransceiver,
    samples: u16,
    detection_rate: f32,
    settle_delay_ms: u32,
}

impl CalibrationEngine {
    /// Creates an engine from `config`, which is validated first.
    ///
    /// # Returns
    ///
    /// A `ConfigError` if `config` is invalid, for instance with no calibration samples
    pub fn new(config: &UltrasoundConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(CalibrationEngine {
            converter: DistanceConverter::new(config.speed_of_sound_divisor)?,
            transceiver: PulseTransceiver::new(config),
            samples: config.calibration_samples,
            detection_rate: config.detection_rate,
            settle_delay_ms: config.settle_delay_ms,
        })
    }

    /// Calibrates one sensor and stores the result in `registry`.
    ///
    /// A sample whose echo times out counts as the last distance seen during this run, zero if
    /// nothing was seen yet. The mean is truncated toward zero. A zero mean is rejected: either
    /// something sits closer than the minimum range or the sensor is not wired.
    ///
    /// # Returns
    ///
    /// The stored [CalibrationState]. On error the registry is left as it was.
    pub fn calibrate<H: PulseHal>(&self, hal: &mut H, registry: &mut SensorRegistry, id: SensorId) -> Result<CalibrationState, CalibrationError> {
        let pins = registry.pin_assignment(id)?;
        info!("Calibrating ultrasound {}...", id);

        let mut previous: Distance = 0;
        let mut total: u64 = 0;
        for sample in 0..self.samples {
            let raw = self.transceiver.fire(hal, pins)?;
            match self.converter.to_distance(raw) {
                Some(distance) => previous = distance,
                None => debug!("{}: echo timeout on sample {}, keeping {}", id, sample, previous),
            }
            total += u64::from(previous);
            hal.sleep_milliseconds(self.settle_delay_ms);
        }

        let mean = (total / u64::from(self.samples)) as Distance;
        if mean == 0 {
            warn!("Failed to calibrate {}", id);
            warn!("\tRemove any objects closer than the sensor minimum range.");
            warn!("\tDouble check sensor pin connections.");
            return Err(CalibrationError::CalibrationFailed(id));
        }

        let calibration = CalibrationState::from_baseline(mean, self.detection_rate);
        registry.set_calibration(id, calibration)?;
        info!("Calibration done to {}: {}", id, mean);
        Ok(calibration)
    }

    /// Calibrates every registered sensor in ascending id order. A failing sensor is reported
    /// and the remaining ones are still calibrated.
    pub fn calibrate_all<H: PulseHal>(&self, hal: &mut H, registry: &mut SensorRegistry) -> CalibrationReport {
        let ids: Vec<SensorId> = registry.ids().collect();
        let outcomes = ids
            .into_iter()
            .map(|id| (id, self.calibrate(hal, registry, id)))
            .collect();
        CalibrationReport { outcomes }
    }
}
