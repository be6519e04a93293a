use std::collections::HashMap;
use esp_idf_svc::{
    hal::{
        delay::{Delay, FreeRtos},
        gpio::{AnyIOPin, Input, Level as EspLevel, Output, PinDriver, Pull},
    },
    sys::{esp_timer_get_time, EspError},
};
use crate::gpio::{HalError, Level, Pin, PinMode, PulseHal, PulseWidth};
use super::peripherals::Peripherals;

/// A pin handed to an ESP-IDF driver, in the mode it was last configured with
enum PinSlot {
    Input(PinDriver<'static, AnyIOPin, Input>),
    Output(PinDriver<'static, AnyIOPin, Output>),
}

/// ESP32 backed implementation of [PulseHal].
///
/// - `peripherals`: Pins not yet handed to a driver.
/// - `pins`: Drivers of the pins configured so far, keyed by pin number.
/// - `delay`: Busy wait delay used for the microsecond trigger timing.
pub struct Microcontroller {
    peripherals: Peripherals,
    pins: HashMap<Pin, PinSlot>,
    delay: Delay,
}

fn to_esp_level(level: Level) -> EspLevel {
    match level {
        Level::Low => EspLevel::Low,
        Level::High => EspLevel::High,
    }
}

fn now_us() -> i64 {
    unsafe { esp_timer_get_time() }
}

fn input_pull_up(mut driver: PinDriver<'static, AnyIOPin, Input>) -> Result<PinSlot, EspError> {
    driver.set_pull(Pull::Up)?;
    Ok(PinSlot::Input(driver))
}

impl Microcontroller {
    /// Creates a new Microcontroller instance
    ///
    /// # Returns
    ///
    /// The new Microcontroller, with no pin configured
    pub fn new() -> Self {
        esp_idf_svc::sys::link_patches();
        Microcontroller {
            peripherals: Peripherals::new(),
            pins: HashMap::new(),
            delay: Delay::new_default(),
        }
    }

    /// Blocks the current task for `miliseconds`, letting other FreeRTOS tasks run
    pub fn sleep(&self, miliseconds: u32) {
        FreeRtos::delay_ms(miliseconds)
    }

    /// Builds the driver for `pin` in `mode`, reusing the driver if the pin was configured before.
    /// A failed mode change drops the driver, see [PulseHal::set_pin_mode] for how the pin is recovered.
    fn configure(&mut self, pin: Pin, mode: PinMode) -> Result<PinSlot, HalError> {
        let mode_err = |_: EspError| HalError::CannotSetPinMode(pin);
        let slot = match (self.pins.remove(&pin), mode) {
            (None, PinMode::InputPullUp) => {
                let gpio = self.peripherals.get_digital_pin(pin as usize).into_any_io_pin(pin)?;
                input_pull_up(PinDriver::input(gpio).map_err(mode_err)?).map_err(mode_err)?
            }
            (None, PinMode::Output) => {
                let gpio = self.peripherals.get_digital_pin(pin as usize).into_any_io_pin(pin)?;
                PinSlot::Output(PinDriver::output(gpio).map_err(mode_err)?)
            }
            (Some(PinSlot::Input(driver)), PinMode::InputPullUp) => input_pull_up(driver).map_err(mode_err)?,
            (Some(PinSlot::Input(driver)), PinMode::Output) => PinSlot::Output(driver.into_output().map_err(mode_err)?),
            (Some(PinSlot::Output(driver)), PinMode::InputPullUp) => {
                input_pull_up(driver.into_input().map_err(mode_err)?).map_err(mode_err)?
            }
            (Some(PinSlot::Output(driver)), PinMode::Output) => PinSlot::Output(driver),
        };
        Ok(slot)
    }
}

impl Default for Microcontroller {
    fn default() -> Self {
        Self::new()
    }
}

impl PulseHal for Microcontroller {
    /// Configures `pin`. If ESP-IDF rejects the mode the driver is gone, so the pin goes back to
    /// the peripherals and the next call builds a fresh driver for it.
    fn set_pin_mode(&mut self, pin: Pin, mode: PinMode) -> Result<(), HalError> {
        match self.configure(pin, mode) {
            Ok(slot) => {
                self.pins.insert(pin, slot);
                Ok(())
            }
            Err(HalError::CannotSetPinMode(pin)) => {
                self.peripherals.release_digital_pin(pin as usize);
                Err(HalError::CannotSetPinMode(pin))
            }
            Err(err) => Err(err),
        }
    }

    fn write_pin(&mut self, pin: Pin, level: Level) -> Result<(), HalError> {
        match self.pins.get_mut(&pin) {
            Some(PinSlot::Output(driver)) => driver.set_level(to_esp_level(level)).map_err(|_| HalError::CannotWritePin(pin)),
            Some(PinSlot::Input(_)) => Err(HalError::CannotWritePin(pin)),
            None => Err(HalError::InvalidPin(pin)),
        }
    }

    /// Polls the echo pin the same way Arduino's pulseIn does: a pulse already in progress is
    /// let through, then the next full pulse is timed. The timeout covers the whole wait.
    fn measure_pulse_width(&mut self, pin: Pin, level: Level, timeout_us: u32) -> Result<PulseWidth, HalError> {
        let driver = match self.pins.get(&pin) {
            Some(PinSlot::Input(driver)) => driver,
            Some(PinSlot::Output(_)) => return Err(HalError::CannotReadPin(pin)),
            None => return Err(HalError::InvalidPin(pin)),
        };
        let target = to_esp_level(level);
        let deadline = now_us() + i64::from(timeout_us);

        while driver.get_level() == target {
            if now_us() > deadline {
                return Ok(None)
            }
        }
        while driver.get_level() != target {
            if now_us() > deadline {
                return Ok(None)
            }
        }
        let pulse_start = now_us();
        while driver.get_level() == target {
            if now_us() > deadline {
                return Ok(None)
            }
        }
        Ok(Some((now_us() - pulse_start) as u32))
    }

    fn sleep_microseconds(&mut self, us: u32) {
        self.delay.delay_us(us);
    }

    fn sleep_milliseconds(&mut self, ms: u32) {
        self.sleep(ms);
    }
}
