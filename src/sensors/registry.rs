use std::collections::HashSet;

use thiserror::Error;

use super::{CalibrationState, ConfigError, Distance, PinAssignment, SensorId};

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("{0} is not registered")]
pub struct InvalidSensor(pub SensorId);

#[derive(Debug, Clone, PartialEq)]
struct SensorSlot {
    id: SensorId,
    pins: PinAssignment,
    calibration: Option<CalibrationState>,
    last_distance: Option<Distance>,
}

/// Per sensor state: the pin pair fixed at construction, the latest calibration and the latest
/// measured distance. Built once at startup and never resized.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorRegistry {
    slots: Vec<SensorSlot>,
}

impl SensorRegistry {
    /// Creates a registry from a pin map. Sensors are kept in ascending id order.
    ///
    /// # Returns
    ///
    /// A `ConfigError` if the map is empty, an id repeats or a pin is shared between channels
    pub fn new<I: IntoIterator<Item = (SensorId, PinAssignment)>>(pin_map: I) -> Result<Self, ConfigError> {
        let mut slots: Vec<SensorSlot> = pin_map
            .into_iter()
            .map(|(id, pins)| SensorSlot { id, pins, calibration: None, last_distance: None })
            .collect();
        if slots.is_empty() {
            return Err(ConfigError::EmptyPinMap);
        }

        slots.sort_by_key(|slot| slot.id);
        if let Some(pair) = slots.windows(2).find(|pair| pair[0].id == pair[1].id) {
            return Err(ConfigError::DuplicateSensor(pair[0].id));
        }

        let mut used_pins = HashSet::new();
        for slot in &slots {
            for pin in [slot.pins.trigger_pin, slot.pins.echo_pin] {
                if !used_pins.insert(pin) {
                    return Err(ConfigError::DuplicatePin(pin));
                }
            }
        }

        Ok(SensorRegistry { slots })
    }

    fn slot(&self, id: SensorId) -> Result<&SensorSlot, InvalidSensor> {
        self.slots
            .binary_search_by_key(&id, |slot| slot.id)
            .map(|index| &self.slots[index])
            .map_err(|_| InvalidSensor(id))
    }

    fn slot_mut(&mut self, id: SensorId) -> Result<&mut SensorSlot, InvalidSensor> {
        match self.slots.binary_search_by_key(&id, |slot| slot.id) {
            Ok(index) => Ok(&mut self.slots[index]),
            Err(_) => Err(InvalidSensor(id)),
        }
    }

    pub fn contains(&self, id: SensorId) -> bool {
        self.slot(id).is_ok()
    }

    /// Registered ids in ascending order
    pub fn ids(&self) -> impl Iterator<Item = SensorId> + '_ {
        self.slots.iter().map(|slot| slot.id)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn pin_assignment(&self, id: SensorId) -> Result<PinAssignment, InvalidSensor> {
        self.slot(id).map(|slot| slot.pins)
    }

    pub fn pin_assignments(&self) -> impl Iterator<Item = (SensorId, PinAssignment)> + '_ {
        self.slots.iter().map(|slot| (slot.id, slot.pins))
    }

    pub fn get_calibration(&self, id: SensorId) -> Result<Option<CalibrationState>, InvalidSensor> {
        self.slot(id).map(|slot| slot.calibration)
    }

    /// Replaces the whole calibration of a sensor
    pub fn set_calibration(&mut self, id: SensorId, calibration: CalibrationState) -> Result<(), InvalidSensor> {
        self.slot_mut(id)?.calibration = Some(calibration);
        Ok(())
    }

    pub fn get_last_distance(&self, id: SensorId) -> Result<Option<Distance>, InvalidSensor> {
        self.slot(id).map(|slot| slot.last_distance)
    }

    pub fn set_last_distance(&mut self, id: SensorId, distance: Distance) -> Result<(), InvalidSensor> {
        self.slot_mut(id)?.last_distance = Some(distance);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensors::default_pin_map;

    fn registry() -> SensorRegistry {
        SensorRegistry::new(default_pin_map()).unwrap()
    }

    #[test]
    fn pin_assignments_are_stable_and_distinct() {
        let registry = registry();
        let pins: Vec<PinAssignment> = registry.ids().map(|id| registry.pin_assignment(id).unwrap()).collect();

        assert_eq!(pins, vec![
            PinAssignment::new(3, 2),
            PinAssignment::new(5, 4),
            PinAssignment::new(7, 6),
            PinAssignment::new(9, 8),
        ]);
        for id in registry.ids() {
            assert_eq!(registry.pin_assignment(id), registry.pin_assignment(id));
        }
    }

    #[test]
    fn ids_are_sorted() {
        let registry = SensorRegistry::new([
            (SensorId::new(3), PinAssignment::new(7, 6)),
            (SensorId::new(1), PinAssignment::new(3, 2)),
        ])
        .unwrap();
        assert_eq!(registry.ids().collect::<Vec<_>>(), vec![SensorId::new(1), SensorId::new(3)]);
        assert_eq!(registry.len(), 2);
    }

    #[rstest::rstest]
    #[test]
    #[case(0)]
    #[case(5)]
    #[case(255)]
    fn unknown_ids_are_rejected(#[case] number: u8) {
        let mut registry = registry();
        let id = SensorId::new(number);
        let before = registry.clone();

        assert!(!registry.contains(id));
        assert_eq!(registry.pin_assignment(id), Err(InvalidSensor(id)));
        assert_eq!(registry.get_calibration(id), Err(InvalidSensor(id)));
        assert_eq!(registry.get_last_distance(id), Err(InvalidSensor(id)));
        assert_eq!(registry.set_last_distance(id, 10), Err(InvalidSensor(id)));
        assert_eq!(
            registry.set_calibration(id, CalibrationState::from_baseline(10, 0.15)),
            Err(InvalidSensor(id))
        );
        assert_eq!(registry, before);
    }

    #[test]
    fn state_starts_unset() {
        let registry = registry();
        for id in registry.ids() {
            assert_eq!(registry.get_calibration(id), Ok(None));
            assert_eq!(registry.get_last_distance(id), Ok(None));
        }
    }

    #[test]
    fn state_updates_are_per_sensor() {
        let mut registry = registry();
        let calibration = CalibrationState::from_baseline(40, 0.15);

        registry.set_calibration(SensorId::SENSOR2, calibration).unwrap();
        registry.set_last_distance(SensorId::SENSOR3, 12).unwrap();

        assert_eq!(registry.get_calibration(SensorId::SENSOR2), Ok(Some(calibration)));
        assert_eq!(registry.get_calibration(SensorId::SENSOR1), Ok(None));
        assert_eq!(registry.get_last_distance(SensorId::SENSOR3), Ok(Some(12)));
        assert_eq!(registry.get_last_distance(SensorId::SENSOR2), Ok(None));
    }

    #[rstest::rstest]
    #[test]
    #[case::empty(ConfigError::EmptyPinMap, vec![])]
    #[case::repeated_id(ConfigError::DuplicateSensor(SensorId::SENSOR1), vec![
        (SensorId::SENSOR1, PinAssignment::new(3, 2)),
        (SensorId::SENSOR1, PinAssignment::new(5, 4)),
    ])]
    #[case::shared_pin(ConfigError::DuplicatePin(2), vec![
        (SensorId::SENSOR1, PinAssignment::new(3, 2)),
        (SensorId::SENSOR2, PinAssignment::new(5, 2)),
    ])]
    #[case::trigger_is_echo(ConfigError::DuplicatePin(4), vec![
        (SensorId::SENSOR1, PinAssignment::new(4, 4)),
    ])]
    fn invalid_pin_maps(#[case] expect: ConfigError, #[case] pin_map: Vec<(SensorId, PinAssignment)>) {
        assert_eq!(SensorRegistry::new(pin_map), Err(expect));
    }
}
