use std::mem;
use esp_idf_svc::hal::gpio::*;

use crate::gpio::{HalError, Pin};

const PIN_COUNT: usize = 24;
const DIGITAL_PINS_BOUNDS: (usize, usize) = (0,23);

/// Represents an esp32 pin that has not been handed to a driver yet
#[derive(Default)]
pub enum Peripheral{
    Pin(u8),
    #[default]
    None
}

impl Peripheral {
    fn take(&mut self) -> Peripheral {
        mem::take(self)
    }

    /// If the Peripheral is a Pin returns the corresponding AnyIoPin.
    /// If not it returns HalError::InvalidPin
    pub fn into_any_io_pin(self, pin: Pin) -> Result<AnyIOPin, HalError> {
        let any_pin = match self {
            Peripheral::Pin(pin_num) => match pin_num{
                0 => unsafe {Gpio0::new().downgrade()},
                1 => unsafe {Gpio1::new().downgrade()},
                2 => unsafe {Gpio2::new().downgrade()},
                3 => unsafe {Gpio3::new().downgrade()},
                4 => unsafe {Gpio4::new().downgrade()},
                5 => unsafe {Gpio5::new().downgrade()},
                6 => unsafe {Gpio6::new().downgrade()},
                7 => unsafe {Gpio7::new().downgrade()},
                8 => unsafe {Gpio8::new().downgrade()},
                9 => unsafe {Gpio9::new().downgrade()},
                10 => unsafe {Gpio10::new().downgrade()},
                11 => unsafe {Gpio11::new().downgrade()},
                12 => unsafe {Gpio12::new().downgrade()},
                13 => unsafe {Gpio13::new().downgrade()},
                15 => unsafe {Gpio15::new().downgrade()},
                16 => unsafe {Gpio16::new().downgrade()},
                17 => unsafe {Gpio17::new().downgrade()},
                18 => unsafe {Gpio18::new().downgrade()},
                19 => unsafe {Gpio19::new().downgrade()},
                20 => unsafe {Gpio20::new().downgrade()},
                21 => unsafe {Gpio21::new().downgrade()},
                22 => unsafe {Gpio22::new().downgrade()},
                23 => unsafe {Gpio23::new().downgrade()},
                _ => return Err(HalError::InvalidPin(pin))
            },
            Peripheral::None => return Err(HalError::InvalidPin(pin)),
        };
        Ok(any_pin)
    }
}

/// Digital pins of the esp32C6. Each pin can be taken only once, subsequent gets return
/// Peripheral::None. Gpio14 is not bonded out on the C6 and is never available.
pub struct Peripherals {
    pins: [Peripheral;PIN_COUNT],
}

impl Peripherals {
    pub fn new() -> Peripherals {
        let pins: [Peripheral; PIN_COUNT] = [Peripheral::Pin(0), Peripheral::Pin(1), Peripheral::Pin(2), Peripheral::Pin(3), Peripheral::Pin(4), Peripheral::Pin(5), Peripheral::Pin(6), Peripheral::Pin(7), Peripheral::Pin(8), Peripheral::Pin(9), Peripheral::Pin(10), Peripheral::Pin(11), Peripheral::Pin(12), Peripheral::Pin(13), Peripheral::None, Peripheral::Pin(15), Peripheral::Pin(16), Peripheral::Pin(17), Peripheral::Pin(18), Peripheral::Pin(19), Peripheral::Pin(20), Peripheral::Pin(21), Peripheral::Pin(22), Peripheral::Pin(23)];
        Peripherals { pins }
    }

    pub fn get_digital_pin(&mut self, pin_num: usize) -> Peripheral {
        if pin_num >= DIGITAL_PINS_BOUNDS.0 && pin_num <= DIGITAL_PINS_BOUNDS.1 {
            return self.pins[pin_num].take()
        }
        Peripheral::None
    }

    /// Hands a pin back once its driver has been dropped, so it can be taken again
    pub fn release_digital_pin(&mut self, pin_num: usize) {
        if pin_num >= DIGITAL_PINS_BOUNDS.0 && pin_num <= DIGITAL_PINS_BOUNDS.1 && pin_num != 14 {
            self.pins[pin_num] = Peripheral::Pin(pin_num as u8);
        }
    }
}

impl Default for Peripherals {
    fn default() -> Self {
        Self::new()
    }
}
