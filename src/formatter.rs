use crate::calibration::{CO2_GAIN, HUMIDITY_GAIN, TEMPERATURE_GAIN, TEMPERATURE_OFFSET};
use crate::common::{SensorId, Target};
use crate::device::RawCount;
use crate::engine::{ExecError, OpOutcome, OpResult};

pub const HELP_TEXT: &str = "Read sensor:\t\tread t1|t2|t3|t4|t5|rh|co2\r\n\
Set temperature:\tset temp [temperature from 0 to 50 degree]\r\n\
Set fan speed:\t\tset fan off|low|medium|high\r\n\
Set EP level:\t\tset ep1|ep2|ep3|ep4 [EP value from 0 to 5]\r\n\
Quit:\t\t\tquit\r\n";

pub const DEVICE_ERROR_REPLY: &str = "ADDA error\r\n";

pub fn format_reply(target: Option<&Target>, outcome: &Result<Vec<OpResult>, ExecError>) -> String {
    let results = match (target, outcome) {
        (Some(_), Ok(results)) => results,
        _ => return HELP_TEXT.to_string(),
    };
    if results.iter().any(|r| r.is_err()) {
        return DEVICE_ERROR_REPLY.to_string();
    }

    match target {
        Some(Target::Sensor(sensor)) => {
            let sample = results.iter().find_map(|r| match r {
                Ok(OpOutcome::Sampled(raw)) => Some(*raw),
                _ => None,
            });
            match sample {
                Some(raw) => format!("{} reading is {}\r\n", sensor, scale_reading(*sensor, raw)),
                None => HELP_TEXT.to_string(),
            }
        }
        Some(Target::Actuator {
            actuator,
            requested,
        }) => format!("{} is set to {}\r\n", actuator, requested),
        None => HELP_TEXT.to_string(),
    }
}

/// Converts a sample into the sensor's unit, e.g. `126.0 degree`.
pub fn scale_reading(sensor: SensorId, raw: RawCount) -> String {
    let raw = raw.value();
    let (value, unit) = match sensor {
        SensorId::T1 | SensorId::T2 | SensorId::T3 | SensorId::T4 | SensorId::T5 => {
            (TEMPERATURE_OFFSET + raw * TEMPERATURE_GAIN, "degree")
        }
        SensorId::Rh => (raw * HUMIDITY_GAIN, "RH"),
        SensorId::Co2 => (raw * CO2_GAIN, "PPM"),
    };
    format!("{} {}", decimal(value), unit)
}

// Two decimals at most, and always at least one: 126.0, 16.2, 19.85
fn decimal(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    format!("{:?}", rounded)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::common::ActuatorId;
    use crate::device::DeviceError;

    fn read_results(raw: u8) -> Result<Vec<OpResult>, ExecError> {
        Ok(vec![
            Ok(OpOutcome::Written),
            Ok(OpOutcome::Sampled(RawCount(raw))),
            Ok(OpOutcome::Written),
        ])
    }

    #[test]
    fn temperature_scaling() {
        let t2 = Target::Sensor(SensorId::T2);
        assert_eq!(
            format_reply(Some(&t2), &read_results(100)),
            "t2 reading is 236.0 degree\r\n"
        );
        assert_eq!(scale_reading(SensorId::T1, RawCount(50)), "126.0 degree");
        assert_eq!(scale_reading(SensorId::T5, RawCount(0)), "16.0 degree");
        assert_eq!(scale_reading(SensorId::T4, RawCount(1)), "18.2 degree");
    }

    #[test]
    fn humidity_and_co2_scaling() {
        assert_eq!(scale_reading(SensorId::Rh, RawCount(50)), "1000.0 RH");
        assert_eq!(scale_reading(SensorId::Co2, RawCount(3)), "60.0 PPM");
    }

    #[test]
    fn every_sensor_matches_its_formula() {
        for sensor in SensorId::ALL {
            for raw in [0u8, 7, 128, 255] {
                let expected = match sensor {
                    SensorId::Rh | SensorId::Co2 => f64::from(raw) * 20.0,
                    _ => 16.0 + f64::from(raw) * 2.2,
                };
                let text = scale_reading(sensor, RawCount(raw));
                let value: f64 = text.split(' ').next().unwrap().parse().unwrap();
                assert!((value - expected).abs() < 0.005, "{} {}", sensor, text);
            }
        }
    }

    #[test]
    fn set_echoes_requested_value() {
        let target = Target::Actuator {
            actuator: ActuatorId::Fan,
            requested: "high".to_string(),
        };
        let outcome = Ok(vec![
            Ok(OpOutcome::Written),
            Ok(OpOutcome::Written),
            Ok(OpOutcome::Written),
        ]);
        assert_eq!(format_reply(Some(&target), &outcome), "fan is set to high\r\n");
    }

    #[test]
    fn device_failure_reply() {
        let target = Target::Sensor(SensorId::Rh);
        let outcome = Ok(vec![
            Ok(OpOutcome::Written),
            Err(DeviceError::NoSuchChannel(9)),
            Ok(OpOutcome::Written),
        ]);
        assert_eq!(format_reply(Some(&target), &outcome), "ADDA error\r\n");
    }

    #[test]
    fn structural_failure_is_help() {
        let target = Target::Sensor(SensorId::Rh);
        assert_eq!(
            format_reply(Some(&target), &Err(ExecError::Unrecognized)),
            HELP_TEXT
        );
        assert_eq!(format_reply(None, &Err(ExecError::Unrecognized)), HELP_TEXT);
    }
}
