// Physical addressing and scaling contract of the ADDA board.
// These values are wired into the HVAC rig; do not tune them.

use std::time::Duration;

pub const FULL_SCALE_VOLTS: f64 = 5.0;
pub const FULL_SCALE_COUNTS: f64 = 255.0;

// DAC channels
pub const ACTUATOR_SELECT_CHANNEL: u8 = 0;
pub const ACTUATOR_VALUE_CHANNEL: u8 = 1;
pub const MUX_SELECT_CHANNEL: u8 = 2;

// ADC channels
pub const SENSOR_INPUT_CHANNEL: u8 = 0;

// Multiplexer select voltage: MUX_BASE_VOLTS + index * MUX_STEP_VOLTS.
// The t1 input sits off the regular grid.
pub const MUX_BASE_VOLTS: f64 = 0.5;
pub const MUX_STEP_VOLTS: f64 = 0.4;
pub const T1_MUX_VOLTS: f64 = 0.6;

// Actuator address voltage: ACTUATOR_ADDRESS_BASE_VOLTS + slot * ACTUATOR_ADDRESS_STEP_VOLTS.
pub const ACTUATOR_ADDRESS_BASE_VOLTS: f64 = 0.75;
pub const ACTUATOR_ADDRESS_STEP_VOLTS: f64 = 0.5;

// Temperature set point (degree) to DAC voltage: t * 5/11 - 80/11.
pub const SETPOINT_GAIN_NUM: f64 = 5.0;
pub const SETPOINT_OFFSET_NUM: f64 = 80.0;
pub const SETPOINT_DENOM: f64 = 11.0;

// Reading scales
pub const TEMPERATURE_OFFSET: f64 = 16.0;
pub const TEMPERATURE_GAIN: f64 = 2.2;
pub const HUMIDITY_GAIN: f64 = 20.0;
pub const CO2_GAIN: f64 = 20.0;

pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_secs(0);
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(30);
