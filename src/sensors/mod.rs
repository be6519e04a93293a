mod calibration;
mod config;
mod distance;
mod jsn_sr04t;
mod registry;
mod sensor_id;
mod transceiver;

pub use {
    calibration::*,
    config::*,
    distance::*,
    jsn_sr04t::*,
    registry::*,
    sensor_id::*,
    transceiver::*,
};
