//! Hardware seam between the sensor core and the board.
//!
//! The core never touches registers or pin drivers directly. Everything it needs from the
//! platform (pin configuration, digital writes, pulse timing and blocking delays) goes through
//! [PulseHal]. Diagnostics are emitted through the `log` facade, so the platform decides where
//! they end up by installing a logger.

#[cfg(any(test, feature = "mock"))]
pub mod mock;

use thiserror::Error;

/// Number of a GPIO pin on the board
pub type Pin = u8;

/// Width of an observed pulse in microseconds, `None` if nothing arrived before the timeout
pub type PulseWidth = Option<u32>;

/// Digital level of a pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Low,
    High,
}

/// Direction and pull configuration of a pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinMode {
    /// Digital input with the internal pull up enabled, used for echo pins
    InputPullUp,
    /// Push pull digital output, used for trigger pins
    Output,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HalError {
    #[error("pin {0} does not exist on this board")]
    InvalidPin(Pin),
    #[error("cannot set the mode of pin {0}")]
    CannotSetPinMode(Pin),
    #[error("cannot drive pin {0}")]
    CannotWritePin(Pin),
    #[error("cannot read pin {0}")]
    CannotReadPin(Pin),
}

/// Operations the sensor core needs from the platform.
///
/// Every call blocks the caller for its whole duration. Implementations must not retry on their
/// own: a missing echo is reported as `Ok(None)` and handled by the core.
pub trait PulseHal {
    /// Configures `pin` for the given mode. Called once per pin from `init`.
    fn set_pin_mode(&mut self, pin: Pin, mode: PinMode) -> Result<(), HalError>;

    /// Drives an output pin to `level`
    fn write_pin(&mut self, pin: Pin, level: Level) -> Result<(), HalError>;

    /// Waits for a pulse of `level` on `pin` and returns its width in microseconds.
    ///
    /// # Returns
    ///
    /// `Ok(None)` if no complete pulse was observed within `timeout_us` microseconds.
    fn measure_pulse_width(&mut self, pin: Pin, level: Level, timeout_us: u32) -> Result<PulseWidth, HalError>;

    /// Blocks for `us` microseconds
    fn sleep_microseconds(&mut self, us: u32);

    /// Blocks for `ms` milliseconds
    fn sleep_milliseconds(&mut self, ms: u32);
}

impl<T: PulseHal + ?Sized> PulseHal for &mut T {
    fn set_pin_mode(&mut self, pin: Pin, mode: PinMode) -> Result<(), HalError> {
        (**self).set_pin_mode(pin, mode)
    }

    fn write_pin(&mut self, pin: Pin, level: Level) -> Result<(), HalError> {
        (**self).write_pin(pin, level)
    }

    fn measure_pulse_width(&mut self, pin: Pin, level: Level, timeout_us: u32) -> Result<PulseWidth, HalError> {
        (**self).measure_pulse_width(pin, level, timeout_us)
    }

    fn sleep_microseconds(&mut self, us: u32) {
        (**self).sleep_microseconds(us)
    }

    fn sleep_milliseconds(&mut self, ms: u32) {
        (**self).sleep_milliseconds(ms)
    }
}
