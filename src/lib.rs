//! Driver for arrays of JSN-SR04T waterproof ultrasonic sensors.
//!
//! Each sensor is wired on its own trigger and echo pins. The crate calibrates every sensor
//! against what it sees at rest, derives a detection band around that baseline and measures
//! distances on demand. The board is reached through the [gpio::PulseHal] trait; the ESP-IDF
//! implementation lives behind the `esp` feature.

mod utils;
#[cfg(feature = "esp")]
mod microcontroller_src;

pub mod gpio;
pub mod sensors;

#[cfg(feature = "esp")]
pub use microcontroller_src::Microcontroller;
pub use sensors::{JsnSr04tArray, Reading, SensorId};
pub use utils::ultrasound_error;
pub use utils::ultrasound_error::UltrasoundError;
