use crate::calibration::FULL_SCALE_VOLTS;
use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorId {
    T1,
    T2,
    T3,
    T4,
    T5,
    Rh,
    Co2,
}

impl SensorId {
    pub const ALL: [SensorId; 7] = [
        SensorId::T1,
        SensorId::T2,
        SensorId::T3,
        SensorId::T4,
        SensorId::T5,
        SensorId::Rh,
        SensorId::Co2,
    ];

    pub fn from_name(name: &str) -> Option<SensorId> {
        SensorId::ALL.iter().copied().find(|s| s.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            SensorId::T1 => "t1",
            SensorId::T2 => "t2",
            SensorId::T3 => "t3",
            SensorId::T4 => "t4",
            SensorId::T5 => "t5",
            SensorId::Rh => "rh",
            SensorId::Co2 => "co2",
        }
    }

    /// Position on the input multiplexer.
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for SensorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorId {
    Temp,
    Fan,
    Ep1,
    Ep2,
    Ep3,
    Ep4,
}

impl ActuatorId {
    pub const ALL: [ActuatorId; 6] = [
        ActuatorId::Temp,
        ActuatorId::Fan,
        ActuatorId::Ep1,
        ActuatorId::Ep2,
        ActuatorId::Ep3,
        ActuatorId::Ep4,
    ];

    pub fn from_name(name: &str) -> Option<ActuatorId> {
        ActuatorId::ALL.iter().copied().find(|a| a.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            ActuatorId::Temp => "temp",
            ActuatorId::Fan => "fan",
            ActuatorId::Ep1 => "ep1",
            ActuatorId::Ep2 => "ep2",
            ActuatorId::Ep3 => "ep3",
            ActuatorId::Ep4 => "ep4",
        }
    }

    /// Address slot on the actuator select line. Slot 2 is not populated
    /// on the board, so the EP outputs start at 3.
    pub fn index(self) -> usize {
        match self {
            ActuatorId::Temp => 0,
            ActuatorId::Fan => 1,
            ActuatorId::Ep1 => 3,
            ActuatorId::Ep2 => 4,
            ActuatorId::Ep3 => 5,
            ActuatorId::Ep4 => 6,
        }
    }
}

impl fmt::Display for ActuatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// DAC output level, always within `0..=5` volts.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Volts(f64);

impl Volts {
    pub const ZERO: Volts = Volts(0.0);

    pub fn new(value: f64) -> Option<Volts> {
        if (0.0..=FULL_SCALE_VOLTS).contains(&value) {
            Some(Volts(value))
        } else {
            None
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl fmt::Display for Volts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}V", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParsedCommand {
    ReadSensor(SensorId),
    SetActuator {
        actuator: ActuatorId,
        level: Volts,
        // value token as typed, echoed back in the reply
        requested: String,
    },
    Quit,
    Invalid,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Op {
    SetOutput { channel: u8, voltage: Volts },
    GetInput { channel: u8 },
    Delay(Duration),
}

pub type OpSequence = Vec<Op>;

/// What a compiled sequence acts on, kept for formatting the reply.
#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    Sensor(SensorId),
    Actuator {
        actuator: ActuatorId,
        requested: String,
    },
}
