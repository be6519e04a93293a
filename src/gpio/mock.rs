//! Scripted in-memory HAL for exercising the sensor core without hardware.
//!
//! Echo widths are queued per echo pin. When a pin's queue runs dry the pin answers with its
//! steady echo, which is a timeout unless set otherwise. Every call is recorded so tests can
//! check the trigger sequence and the delays the core asked for.

use std::collections::{HashMap, HashSet, VecDeque};

use super::{HalError, Level, Pin, PinMode, PulseHal, PulseWidth};

/// A single recorded call into the HAL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HalEvent {
    SetPinMode(Pin, PinMode),
    WritePin(Pin, Level),
    MeasurePulseWidth(Pin, Level, u32),
    SleepMicroseconds(u32),
    SleepMilliseconds(u32),
}

#[derive(Debug, Default)]
pub struct MockPulseHal {
    modes: HashMap<Pin, PinMode>,
    echoes: HashMap<Pin, VecDeque<PulseWidth>>,
    steady_echoes: HashMap<Pin, PulseWidth>,
    broken_pins: HashSet<Pin>,
    events: Vec<HalEvent>,
}

impl MockPulseHal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues one echo answer for `echo_pin`
    pub fn push_echo(&mut self, echo_pin: Pin, width: PulseWidth) -> &mut Self {
        self.echoes.entry(echo_pin).or_default().push_back(width);
        self
    }

    /// Queues several echo answers for `echo_pin`, in order
    pub fn push_echoes<I: IntoIterator<Item = PulseWidth>>(&mut self, echo_pin: Pin, widths: I) -> &mut Self {
        self.echoes.entry(echo_pin).or_default().extend(widths);
        self
    }

    /// Answer returned by `echo_pin` once its queue is empty
    pub fn set_steady_echo(&mut self, echo_pin: Pin, width: PulseWidth) -> &mut Self {
        self.steady_echoes.insert(echo_pin, width);
        self
    }

    /// Makes every operation on `pin` fail, as a pin missing from the board would
    pub fn break_pin(&mut self, pin: Pin) -> &mut Self {
        self.broken_pins.insert(pin);
        self
    }

    pub fn pin_mode(&self, pin: Pin) -> Option<PinMode> {
        self.modes.get(&pin).copied()
    }

    pub fn events(&self) -> &[HalEvent] {
        &self.events
    }

    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    /// Amount of trigger pulses (rising writes) sent on `trigger_pin`
    pub fn trigger_count(&self, trigger_pin: Pin) -> usize {
        self.events
            .iter()
            .filter(|event| **event == HalEvent::WritePin(trigger_pin, Level::High))
            .count()
    }

    /// Echo answers still queued for `echo_pin`
    pub fn pending_echoes(&self, echo_pin: Pin) -> usize {
        self.echoes.get(&echo_pin).map_or(0, VecDeque::len)
    }

    /// Sum of every millisecond delay requested so far
    pub fn slept_milliseconds(&self) -> u64 {
        self.events
            .iter()
            .filter_map(|event| match event {
                HalEvent::SleepMilliseconds(ms) => Some(*ms as u64),
                _ => None,
            })
            .sum()
    }

    /// Sum of every microsecond delay requested so far
    pub fn slept_microseconds(&self) -> u64 {
        self.events
            .iter()
            .filter_map(|event| match event {
                HalEvent::SleepMicroseconds(us) => Some(*us as u64),
                _ => None,
            })
            .sum()
    }

    fn check_pin(&self, pin: Pin) -> Result<(), HalError> {
        if self.broken_pins.contains(&pin) {
            return Err(HalError::InvalidPin(pin));
        }
        Ok(())
    }
}

impl PulseHal for MockPulseHal {
    fn set_pin_mode(&mut self, pin: Pin, mode: PinMode) -> Result<(), HalError> {
        self.events.push(HalEvent::SetPinMode(pin, mode));
        self.check_pin(pin).map_err(|_| HalError::CannotSetPinMode(pin))?;
        self.modes.insert(pin, mode);
        Ok(())
    }

    fn write_pin(&mut self, pin: Pin, level: Level) -> Result<(), HalError> {
        self.events.push(HalEvent::WritePin(pin, level));
        self.check_pin(pin)?;
        match self.modes.get(&pin) {
            Some(PinMode::Output) => Ok(()),
            _ => Err(HalError::CannotWritePin(pin)),
        }
    }

    fn measure_pulse_width(&mut self, pin: Pin, level: Level, timeout_us: u32) -> Result<PulseWidth, HalError> {
        self.events.push(HalEvent::MeasurePulseWidth(pin, level, timeout_us));
        self.check_pin(pin)?;
        if self.modes.get(&pin) != Some(&PinMode::InputPullUp) {
            return Err(HalError::CannotReadPin(pin));
        }

        let width = match self.echoes.get_mut(&pin).and_then(VecDeque::pop_front) {
            Some(width) => width,
            None => self.steady_echoes.get(&pin).copied().flatten(),
        };
        // A pulse longer than the timeout is never seen complete
        Ok(width.filter(|width| *width <= timeout_us))
    }

    fn sleep_microseconds(&mut self, us: u32) {
        self.events.push(HalEvent::SleepMicroseconds(us));
    }

    fn sleep_milliseconds(&mut self, ms: u32) {
        self.events.push(HalEvent::SleepMilliseconds(ms));
    }
}
