// ADDA interface board: an 8 channel ADC and a DAC sharing one I2C bus,
// plus two status LEDs on GPIO.

use crate::calibration::{FULL_SCALE_COUNTS, FULL_SCALE_VOLTS};
use crate::common::Volts;
use crate::device::{AnalogDevice, DeviceError, Indicator, IndicatorState, RawCount};
use embedded_hal::digital::OutputPin;
use embedded_hal::i2c::I2c;
use log::{debug, info, warn};

pub const DEFAULT_ADC_ADDRESS: u8 = 0x1D;
pub const DEFAULT_DAC_ADDRESS: u8 = 0x1F;

const ADC_CHANNELS: u8 = 8;
const DAC_CHANNELS: u8 = 8;

const ADC_REG_CHANNEL_DISABLE: u8 = 0x08;
const ADC_REG_ONE_SHOT: u8 = 0x09;
const ADC_REG_ADVANCED_CONFIG: u8 = 0x0B;
const ADC_REG_BUSY_STATUS: u8 = 0x0C;
const ADC_REG_READING_BASE: u8 = 0x20;

const ADC_BUSY_CONVERTING: u8 = 0x01;
const ADC_BUSY_NOT_READY: u8 = 0x02;
// mode 1, external reference
const ADC_MODE_1_EXT_VREF: u8 = 0x03;
// only input 0 is converted
const ADC_ENABLE_INPUT_0: u8 = 0xFE;

const DAC_CMD_EXT_VREF: u8 = 0b0010_0000;
const DAC_CMD_WRITE_ALL: u8 = 0b1100_0000;
const DAC_CMD_UPDATE_ALL: u8 = 0b1100_0001;
const DAC_CMD_WRITE_UPDATE_BASE: u8 = 0b1011_0000;

const MAX_BUSY_POLLS: u32 = 10_000;

pub struct AddaBoard<B> {
    bus: B,
    adc_address: u8,
    dac_address: u8,
}

impl<B: I2c> AddaBoard<B> {
    /// Brings both converters into their working mode.
    pub fn new(bus: B, adc_address: u8, dac_address: u8) -> Result<Self, DeviceError> {
        let mut board = AddaBoard {
            bus,
            adc_address,
            dac_address,
        };
        board.init_dac()?;
        board.init_adc()?;
        info!(
            "adda board ready (adc 0x{:02x}, dac 0x{:02x})",
            adc_address, dac_address
        );
        Ok(board)
    }

    fn init_dac(&mut self) -> Result<(), DeviceError> {
        self.dac_write(&[DAC_CMD_EXT_VREF, 0, 0])?;
        self.dac_write(&[DAC_CMD_WRITE_ALL, 127, 127])?;
        self.dac_write(&[DAC_CMD_UPDATE_ALL, 0, 0])
    }

    fn init_adc(&mut self) -> Result<(), DeviceError> {
        self.adc_wait_clear(ADC_BUSY_NOT_READY)?;
        self.adc_write(ADC_REG_ADVANCED_CONFIG, ADC_MODE_1_EXT_VREF)?;
        self.adc_write(ADC_REG_CHANNEL_DISABLE, ADC_ENABLE_INPUT_0)
    }

    fn adc_wait_clear(&mut self, mask: u8) -> Result<(), DeviceError> {
        for _ in 0..MAX_BUSY_POLLS {
            if self.adc_read(ADC_REG_BUSY_STATUS)? & mask == 0 {
                return Ok(());
            }
        }
        Err(DeviceError::Busy {
            chip: "adc",
            polls: MAX_BUSY_POLLS,
        })
    }

    fn adc_read(&mut self, register: u8) -> Result<u8, DeviceError> {
        let mut value = [0u8];
        self.bus
            .write_read(self.adc_address, &[register], &mut value)
            .map_err(|e| bus_error("adc", e))?;
        Ok(value[0])
    }

    fn adc_write(&mut self, register: u8, value: u8) -> Result<(), DeviceError> {
        self.bus
            .write(self.adc_address, &[register, value])
            .map_err(|e| bus_error("adc", e))
    }

    fn dac_write(&mut self, frame: &[u8]) -> Result<(), DeviceError> {
        self.bus
            .write(self.dac_address, frame)
            .map_err(|e| bus_error("dac", e))
    }
}

impl<B: I2c> AnalogDevice for AddaBoard<B> {
    fn write_output(&mut self, channel: u8, voltage: Volts) -> Result<(), DeviceError> {
        if channel >= DAC_CHANNELS {
            return Err(DeviceError::NoSuchChannel(channel));
        }
        let code = (voltage.value() * FULL_SCALE_COUNTS / FULL_SCALE_VOLTS) as u8;
        debug!("dac channel {} <- {} (code {})", channel, voltage, code);
        self.dac_write(&[DAC_CMD_WRITE_UPDATE_BASE + channel, code, 0])
    }

    fn read_input(&mut self, channel: u8) -> Result<RawCount, DeviceError> {
        if channel >= ADC_CHANNELS {
            return Err(DeviceError::NoSuchChannel(channel));
        }
        self.adc_write(ADC_REG_ONE_SHOT, 0x01)?;
        self.adc_wait_clear(ADC_BUSY_CONVERTING)?;
        let raw = RawCount(self.adc_read(ADC_REG_READING_BASE + channel)?);
        debug!("adc channel {} -> {} ({:.3}V)", channel, raw.0, raw.volts());
        Ok(raw)
    }
}

fn bus_error<E: embedded_hal::i2c::Error>(chip: &'static str, e: E) -> DeviceError {
    DeviceError::Bus {
        chip,
        cause: format!("{:?}", e),
    }
}

pub struct GpioIndicator<P> {
    name: &'static str,
    pin: P,
}

impl<P: OutputPin> GpioIndicator<P> {
    pub fn new(name: &'static str, pin: P) -> Self {
        let mut indicator = GpioIndicator { name, pin };
        indicator.set(IndicatorState::Off);
        indicator
    }
}

impl<P: OutputPin> Indicator for GpioIndicator<P> {
    fn set(&mut self, state: IndicatorState) {
        let result = match state {
            IndicatorState::On => self.pin.set_high(),
            IndicatorState::Off => self.pin.set_low(),
        };
        if let Err(e) = result {
            warn!("{} led {:?} failed ({:?})", self.name, state, e);
        }
    }
}
