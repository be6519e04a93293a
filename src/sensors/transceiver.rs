use crate::gpio::{HalError, Level, PulseHal, PulseWidth};
use super::{PinAssignment, UltrasoundConfig};

/// Sends the trigger burst of one ranging cycle and times the echo that comes back
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PulseTransceiver {
    trigger_clear_us: u32,
    trigger_pulse_us: u32,
    echo_timeout_us: u32,
}

impl PulseTransceiver {
    pub fn new(config: &UltrasoundConfig) -> Self {
        PulseTransceiver {
            trigger_clear_us: config.trigger_clear_us,
            trigger_pulse_us: config.trigger_pulse_us,
            echo_timeout_us: config.echo_timeout_us,
        }
    }

    /// Runs one ranging cycle on `pins`.
    ///
    /// The trigger is first held low for a clean edge, then held high long enough for the sensor
    /// to emit its burst, and released. The echo pin then stays high for the round trip time.
    ///
    /// # Returns
    ///
    /// The echo width in microseconds, or `None` if no echo ended before the timeout
    pub fn fire<H: PulseHal>(&self, hal: &mut H, pins: PinAssignment) -> Result<PulseWidth, HalError> {
        hal.write_pin(pins.trigger_pin, Level::Low)?;
        hal.sleep_microseconds(self.trigger_clear_us);
        hal.write_pin(pins.trigger_pin, Level::High)?;
        hal.sleep_microseconds(self.trigger_pulse_us);
        hal.write_pin(pins.trigger_pin, Level::Low)?;
        hal.measure_pulse_width(pins.echo_pin, Level::High, self.echo_timeout_us)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpio::mock::{HalEvent, MockPulseHal};
    use crate::gpio::PinMode;

    fn configured_hal() -> MockPulseHal {
        let mut hal = MockPulseHal::new();
        hal.set_pin_mode(3, PinMode::Output).unwrap();
        hal.set_pin_mode(2, PinMode::InputPullUp).unwrap();
        hal.clear_events();
        hal
    }

    #[test]
    fn trigger_sequence() {
        let mut hal = configured_hal();
        hal.push_echo(2, Some(1160));
        let transceiver = PulseTransceiver::new(&UltrasoundConfig::default());

        let width = transceiver.fire(&mut hal, PinAssignment::new(3, 2)).unwrap();

        assert_eq!(width, Some(1160));
        assert_eq!(
            hal.events(),
            &[
                HalEvent::WritePin(3, Level::Low),
                HalEvent::SleepMicroseconds(2),
                HalEvent::WritePin(3, Level::High),
                HalEvent::SleepMicroseconds(10),
                HalEvent::WritePin(3, Level::Low),
                HalEvent::MeasurePulseWidth(2, Level::High, 26_000),
            ]
        );
    }

    #[test]
    fn timeout_is_not_an_error() {
        let mut hal = configured_hal();
        let transceiver = PulseTransceiver::new(&UltrasoundConfig::default());
        assert_eq!(transceiver.fire(&mut hal, PinAssignment::new(3, 2)), Ok(None));
    }

    #[test]
    fn custom_timing() {
        let mut hal = configured_hal();
        let config = UltrasoundConfig::default()
            .with_trigger_timing_us(5, 20)
            .with_echo_timeout_us(10_000);
        PulseTransceiver::new(&config).fire(&mut hal, PinAssignment::new(3, 2)).unwrap();

        assert_eq!(hal.slept_microseconds(), 25);
        assert_eq!(hal.events().last(), Some(&HalEvent::MeasurePulseWidth(2, Level::High, 10_000)));
    }

    #[test]
    fn hal_failures_propagate() {
        let mut hal = MockPulseHal::new();
        let transceiver = PulseTransceiver::new(&UltrasoundConfig::default());
        assert_eq!(
            transceiver.fire(&mut hal, PinAssignment::new(3, 2)),
            Err(HalError::CannotWritePin(3))
        );
    }
}
