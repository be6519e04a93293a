use crate::gpio::PulseWidth;
use super::ConfigError;

/// Distance in the unit set by the speed of sound divisor, centimetres by default
pub type Distance = u32;

/// Turns echo widths into distances
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DistanceConverter {
    speed_of_sound_divisor: u32,
}

impl DistanceConverter {
    /// Creates a converter for `speed_of_sound_divisor` round trip microseconds per distance
    /// unit.
    ///
    /// # Returns
    ///
    /// `ConfigError::ZeroDivisor` if `speed_of_sound_divisor` is zero
    pub fn new(speed_of_sound_divisor: u32) -> Result<Self, ConfigError> {
        if speed_of_sound_divisor == 0 {
            return Err(ConfigError::ZeroDivisor);
        }
        Ok(DistanceConverter { speed_of_sound_divisor })
    }

    /// Converts an echo width into a distance, truncating toward zero.
    ///
    /// # Returns
    ///
    /// `None` if the echo timed out. A missing echo means nothing was heard, not that an object
    /// sits on the sensor, so callers keep their previous distance instead.
    pub fn to_distance(&self, raw: PulseWidth) -> Option<Distance> {
        raw.map(|width_us| width_us / self.speed_of_sound_divisor)
    }
}
