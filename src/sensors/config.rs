use thiserror::Error;

use crate::gpio::Pin;
use super::SensorId;

const DEFAULT_CALIBRATION_SAMPLES: u16 = 100;
const DEFAULT_DETECTION_RATE: f32 = 0.15;
/// Round trip microseconds per centimetre at roughly 20°C
const DEFAULT_SPEED_OF_SOUND_DIVISOR: u32 = 58;
/// Echo width of the farthest object the JSN-SR04T can see
const DEFAULT_ECHO_TIMEOUT_US: u32 = 26_000;
const DEFAULT_SETTLE_DELAY_MS: u32 = 50;
const DEFAULT_INIT_SETTLE_MS: u32 = 20;
const DEFAULT_TRIGGER_CLEAR_US: u32 = 2;
const DEFAULT_TRIGGER_PULSE_US: u32 = 10;

#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    #[error("calibration needs at least one sample")]
    NoCalibrationSamples,
    #[error("detection rate {0} must be finite and within [0, 1)")]
    InvalidDetectionRate(f32),
    #[error("speed of sound divisor must not be zero")]
    ZeroDivisor,
    #[error("echo timeout must not be zero")]
    ZeroEchoTimeout,
    #[error("no sensors in the pin map")]
    EmptyPinMap,
    #[error("{0} is registered more than once")]
    DuplicateSensor(SensorId),
    #[error("pin {0} is assigned more than once")]
    DuplicatePin(Pin),
}

/// Timing and algorithm constants of the driver.
///
/// Start from [UltrasoundConfig::default] and adjust with the `with_*` setters. The result is
/// checked when the sensor array is built.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UltrasoundConfig {
    pub calibration_samples: u16,
    pub detection_rate: f32,
    pub speed_of_sound_divisor: u32,
    pub echo_timeout_us: u32,
    pub settle_delay_ms: u32,
    pub init_settle_ms: u32,
    pub trigger_clear_us: u32,
    pub trigger_pulse_us: u32,
}

impl Default for UltrasoundConfig {
    fn default() -> Self {
        UltrasoundConfig {
            calibration_samples: DEFAULT_CALIBRATION_SAMPLES,
            detection_rate: DEFAULT_DETECTION_RATE,
            speed_of_sound_divisor: DEFAULT_SPEED_OF_SOUND_DIVISOR,
            echo_timeout_us: DEFAULT_ECHO_TIMEOUT_US,
            settle_delay_ms: DEFAULT_SETTLE_DELAY_MS,
            init_settle_ms: DEFAULT_INIT_SETTLE_MS,
            trigger_clear_us: DEFAULT_TRIGGER_CLEAR_US,
            trigger_pulse_us: DEFAULT_TRIGGER_PULSE_US,
        }
    }
}

impl UltrasoundConfig {
    pub fn with_calibration_samples(mut self, samples: u16) -> Self {
        self.calibration_samples = samples;
        self
    }

    pub fn with_detection_rate(mut self, rate: f32) -> Self {
        self.detection_rate = rate;
        self
    }

    pub fn with_speed_of_sound_divisor(mut self, divisor: u32) -> Self {
        self.speed_of_sound_divisor = divisor;
        self
    }

    pub fn with_echo_timeout_us(mut self, timeout_us: u32) -> Self {
        self.echo_timeout_us = timeout_us;
        self
    }

    pub fn with_settle_delay_ms(mut self, delay_ms: u32) -> Self {
        self.settle_delay_ms = delay_ms;
        self
    }

    pub fn with_init_settle_ms(mut self, delay_ms: u32) -> Self {
        self.init_settle_ms = delay_ms;
        self
    }

    /// Sets the low time before the trigger pulse and the width of the trigger pulse itself
    pub fn with_trigger_timing_us(mut self, clear_us: u32, pulse_us: u32) -> Self {
        self.trigger_clear_us = clear_us;
        self.trigger_pulse_us = pulse_us;
        self
    }

    /// Checks that the configuration can drive a calibration
    ///
    /// # Returns
    ///
    /// The first problem found as a [ConfigError]
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.calibration_samples == 0 {
            return Err(ConfigError::NoCalibrationSamples);
        }
        if !self.detection_rate.is_finite() || !(0.0..1.0).contains(&self.detection_rate) {
            return Err(ConfigError::InvalidDetectionRate(self.detection_rate));
        }
        if self.speed_of_sound_divisor == 0 {
            return Err(ConfigError::ZeroDivisor);
        }
        if self.echo_timeout_us == 0 {
            return Err(ConfigError::ZeroEchoTimeout);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_board() {
        let config = UltrasoundConfig::default();
        assert_eq!(config.calibration_samples, 100);
        assert_eq!(config.speed_of_sound_divisor, 58);
        assert_eq!(config.echo_timeout_us, 26_000);
        assert_eq!(config.settle_delay_ms, 50);
        assert_eq!(config.init_settle_ms, 20);
        assert_eq!((config.trigger_clear_us, config.trigger_pulse_us), (2, 10));
        assert!((config.detection_rate - 0.15).abs() < f32::EPSILON);
        assert_eq!(config.validate(), Ok(()));
    }

    #[rstest::rstest]
    #[test]
    #[case::no_samples(Err(ConfigError::NoCalibrationSamples), UltrasoundConfig::default().with_calibration_samples(0))]
    #[case::negative_rate(Err(ConfigError::InvalidDetectionRate(-0.1)), UltrasoundConfig::default().with_detection_rate(-0.1))]
    #[case::rate_of_one(Err(ConfigError::InvalidDetectionRate(1.0)), UltrasoundConfig::default().with_detection_rate(1.0))]
    #[case::zero_divisor(Err(ConfigError::ZeroDivisor), UltrasoundConfig::default().with_speed_of_sound_divisor(0))]
    #[case::zero_timeout(Err(ConfigError::ZeroEchoTimeout), UltrasoundConfig::default().with_echo_timeout_us(0))]
    #[case::zero_rate(Ok(()), UltrasoundConfig::default().with_detection_rate(0.0))]
    #[case::single_sample(Ok(()), UltrasoundConfig::default().with_calibration_samples(1))]
    fn validate(#[case] expect: Result<(), ConfigError>, #[case] config: UltrasoundConfig) {
        assert_eq!(expect, config.validate());
    }

    #[test]
    fn nan_rate_is_rejected() {
        let config = UltrasoundConfig::default().with_detection_rate(f32::NAN);
        assert!(matches!(config.validate(), Err(ConfigError::InvalidDetectionRate(_))));
    }
}
