use std::fmt;

use crate::gpio::Pin;

/// Identifier of a physically wired sensor. Ids are only meaningful once registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SensorId(u8);

impl SensorId {
    pub const SENSOR1: SensorId = SensorId(1);
    pub const SENSOR2: SensorId = SensorId(2);
    pub const SENSOR3: SensorId = SensorId(3);
    pub const SENSOR4: SensorId = SensorId(4);

    pub const fn new(number: u8) -> Self {
        SensorId(number)
    }

    pub const fn number(self) -> u8 {
        self.0
    }
}

impl From<u8> for SensorId {
    fn from(number: u8) -> Self {
        SensorId(number)
    }
}

impl fmt::Display for SensorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sensor {}", self.0)
    }
}

/// Trigger and echo pins of one sensor, fixed for the life of the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PinAssignment {
    pub trigger_pin: Pin,
    pub echo_pin: Pin,
}

impl PinAssignment {
    pub const fn new(trigger_pin: Pin, echo_pin: Pin) -> Self {
        PinAssignment { trigger_pin, echo_pin }
    }
}

/// Wiring of the reference board: four sensors, echo on the even pin and trigger on the next one
pub fn default_pin_map() -> [(SensorId, PinAssignment); 4] {
    [
        (SensorId::SENSOR1, PinAssignment::new(3, 2)),
        (SensorId::SENSOR2, PinAssignment::new(5, 4)),
        (SensorId::SENSOR3, PinAssignment::new(7, 6)),
        (SensorId::SENSOR4, PinAssignment::new(9, 8)),
    ]
}
