use crate::calibration::{SETPOINT_DENOM, SETPOINT_GAIN_NUM, SETPOINT_OFFSET_NUM};
use crate::common::{ActuatorId, ParsedCommand, SensorId, Volts};

const FAN_LEVELS: [&str; 4] = ["off", "low", "medium", "high"];

/// Interprets one protocol line. Anything unknown or out of range comes
/// back as `ParsedCommand::Invalid`.
pub fn parse_command(line: &str) -> ParsedCommand {
    let line = line.trim().to_lowercase();
    let tokens = line.split_whitespace().collect::<Vec<&str>>();

    match tokens.as_slice() {
        ["quit"] => ParsedCommand::Quit,
        ["read", sensor] => SensorId::from_name(sensor)
            .map(ParsedCommand::ReadSensor)
            .unwrap_or(ParsedCommand::Invalid),
        ["set", actuator, value] => parse_set(actuator, value).unwrap_or(ParsedCommand::Invalid),
        _ => ParsedCommand::Invalid,
    }
}

fn parse_set(actuator: &str, value: &str) -> Option<ParsedCommand> {
    let actuator = ActuatorId::from_name(actuator)?;
    let level = match actuator {
        ActuatorId::Fan => FAN_LEVELS.iter().position(|l| *l == value)? as f64,
        ActuatorId::Temp => setpoint_to_volts(value.parse::<f64>().ok()?),
        ActuatorId::Ep1 | ActuatorId::Ep2 | ActuatorId::Ep3 | ActuatorId::Ep4 => {
            value.parse::<f64>().ok()?
        }
    };

    Some(ParsedCommand::SetActuator {
        actuator,
        level: Volts::new(level)?,
        requested: value.to_string(),
    })
}

fn setpoint_to_volts(degrees: f64) -> f64 {
    degrees * SETPOINT_GAIN_NUM / SETPOINT_DENOM - SETPOINT_OFFSET_NUM / SETPOINT_DENOM
}
