//! Example using four JSN-SR04T sensors wired as echo/trigger on GPIO 2/3, 4/5, 6/7 and 8/9.
//! Every sensor is calibrated at start up, then each one is measured once per second and
//! flagged when the distance leaves its calibrated band.

use jsn_sr04t_array::{JsnSr04tArray, Microcontroller, UltrasoundError};

fn main() -> Result<(), UltrasoundError> {
    let micro = Microcontroller::new();
    esp_idf_svc::log::EspLogger::initialize_default();

    let mut sensors = JsnSr04tArray::with_defaults(micro)?;
    sensors.init()?;
    let report = sensors.calibrate_all()?;
    if !report.is_complete() {
        log::warn!("Some sensors did not calibrate, they will only report distances");
    }

    let ids: Vec<_> = sensors.sensor_ids().collect();
    loop {
        for &id in &ids {
            let reading = sensors.get_distance(id)?;
            let Some(distance) = reading.distance() else {
                log::info!("{}: no reading yet", id);
                continue;
            };
            match sensors.thresholds(id)? {
                Some((upper, lower)) if (distance as f32) > upper || (distance as f32) < lower => {
                    log::info!("{}: {} cm, outside [{:.1}, {:.1}]", id, distance, lower, upper)
                }
                _ => log::info!("{}: {} cm", id, distance),
            }
        }
        sensors.hal().sleep(1000);
    }
}
