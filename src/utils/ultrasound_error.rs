use thiserror::Error;

use crate::{
    gpio::HalError,
    sensors::{
        CalibrationError,
        ConfigError,
        InitError,
        InvalidSensor,
        MeasurementError,
    }
};

/// Any error produced by the crate, for callers that handle them all in one place
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum UltrasoundError {
    #[error(transparent)]
    Calibration(#[from] CalibrationError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Hal(#[from] HalError),
    #[error(transparent)]
    Init(#[from] InitError),
    #[error(transparent)]
    InvalidSensor(#[from] InvalidSensor),
    #[error(transparent)]
    Measurement(#[from] MeasurementError),
}
