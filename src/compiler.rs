use crate::calibration::{
    ACTUATOR_ADDRESS_BASE_VOLTS, ACTUATOR_ADDRESS_STEP_VOLTS, ACTUATOR_SELECT_CHANNEL,
    ACTUATOR_VALUE_CHANNEL, DEFAULT_SETTLE_DELAY, MUX_BASE_VOLTS, MUX_SELECT_CHANNEL,
    MUX_STEP_VOLTS, SENSOR_INPUT_CHANNEL, T1_MUX_VOLTS,
};
use crate::common::{ActuatorId, Op, OpSequence, ParsedCommand, SensorId, Target, Volts};
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    pub ops: OpSequence,
    pub target: Option<Target>,
}

#[derive(Debug, Clone, Copy)]
pub struct Compiler {
    // zero disables the pause between mux select and sampling
    settle_delay: Duration,
}

impl Default for Compiler {
    fn default() -> Self {
        Compiler::new(DEFAULT_SETTLE_DELAY)
    }
}

impl Compiler {
    pub fn new(settle_delay: Duration) -> Self {
        Compiler { settle_delay }
    }

    /// Quit, Invalid and anything the calibration table cannot address
    /// compile to an empty program.
    pub fn compile(&self, command: &ParsedCommand) -> Program {
        let program = match command {
            ParsedCommand::ReadSensor(sensor) => self.read_ops(*sensor).map(|ops| Program {
                ops,
                target: Some(Target::Sensor(*sensor)),
            }),
            ParsedCommand::SetActuator {
                actuator,
                level,
                requested,
            } => set_ops(*actuator, *level).map(|ops| Program {
                ops,
                target: Some(Target::Actuator {
                    actuator: *actuator,
                    requested: requested.clone(),
                }),
            }),
            ParsedCommand::Quit | ParsedCommand::Invalid => None,
        };
        program.unwrap_or_default()
    }

    fn read_ops(&self, sensor: SensorId) -> Option<OpSequence> {
        let mut ops = Vec::with_capacity(4);
        ops.push(Op::SetOutput {
            channel: MUX_SELECT_CHANNEL,
            voltage: mux_select_volts(sensor)?,
        });
        if !self.settle_delay.is_zero() {
            ops.push(Op::Delay(self.settle_delay));
        }
        ops.push(Op::GetInput {
            channel: SENSOR_INPUT_CHANNEL,
        });
        ops.push(Op::SetOutput {
            channel: MUX_SELECT_CHANNEL,
            voltage: Volts::ZERO,
        });
        Some(ops)
    }
}

fn set_ops(actuator: ActuatorId, level: Volts) -> Option<OpSequence> {
    Some(vec![
        Op::SetOutput {
            channel: ACTUATOR_VALUE_CHANNEL,
            voltage: level,
        },
        Op::SetOutput {
            channel: ACTUATOR_SELECT_CHANNEL,
            voltage: actuator_address_volts(actuator)?,
        },
        Op::SetOutput {
            channel: ACTUATOR_SELECT_CHANNEL,
            voltage: Volts::ZERO,
        },
    ])
}

pub fn mux_select_volts(sensor: SensorId) -> Option<Volts> {
    match sensor {
        SensorId::T1 => Volts::new(T1_MUX_VOLTS),
        _ => Volts::new(MUX_BASE_VOLTS + sensor.index() as f64 * MUX_STEP_VOLTS),
    }
}

pub fn actuator_address_volts(actuator: ActuatorId) -> Option<Volts> {
    Volts::new(ACTUATOR_ADDRESS_BASE_VOLTS + actuator.index() as f64 * ACTUATOR_ADDRESS_STEP_VOLTS)
}
