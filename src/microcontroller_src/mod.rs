//! ESP-IDF backend of the sensor HAL, only built with the `esp` feature

pub mod microcontroller;
pub mod peripherals;
pub use self::microcontroller::Microcontroller;
