use crate::calibration::{FULL_SCALE_COUNTS, FULL_SCALE_VOLTS};
use crate::common::Volts;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("i2c transfer with {chip} failed: {cause}")]
    Bus { chip: &'static str, cause: String },
    #[error("{chip} stayed busy after {polls} status polls")]
    Busy { chip: &'static str, polls: u32 },
    #[error("channel {0} does not exist")]
    NoSuchChannel(u8),
}

/// Unscaled ADC sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawCount(pub u8);

impl RawCount {
    pub fn value(self) -> f64 {
        f64::from(self.0)
    }

    pub fn volts(self) -> f64 {
        self.value() * FULL_SCALE_VOLTS / FULL_SCALE_COUNTS
    }
}

pub trait AnalogDevice {
    fn write_output(&mut self, channel: u8, voltage: Volts) -> Result<(), DeviceError>;

    fn read_input(&mut self, channel: u8) -> Result<RawCount, DeviceError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorState {
    On,
    Off,
}

/// Status light. Failures are the implementation's to log; a dead LED
/// never stops the server.
pub trait Indicator {
    fn set(&mut self, state: IndicatorState);
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone, PartialEq)]
    pub enum DeviceCall {
        Write { channel: u8, voltage: f64 },
        Read { channel: u8 },
    }

    /// Records every call and answers reads from a queue of scripted samples.
    #[derive(Default)]
    pub struct MockDevice {
        pub calls: Vec<DeviceCall>,
        pub samples: VecDeque<Result<RawCount, DeviceError>>,
        pub fail_writes: bool,
    }

    impl MockDevice {
        pub fn with_samples(samples: &[u8]) -> Self {
            Self {
                samples: samples.iter().map(|s| Ok(RawCount(*s))).collect(),
                ..Default::default()
            }
        }
    }

    impl AnalogDevice for MockDevice {
        fn write_output(&mut self, channel: u8, voltage: Volts) -> Result<(), DeviceError> {
            self.calls.push(DeviceCall::Write {
                channel,
                voltage: voltage.value(),
            });
            if self.fail_writes {
                return Err(DeviceError::Bus {
                    chip: "dac",
                    cause: "nack".to_string(),
                });
            }
            Ok(())
        }

        fn read_input(&mut self, channel: u8) -> Result<RawCount, DeviceError> {
            self.calls.push(DeviceCall::Read { channel });
            self.samples.pop_front().unwrap_or(Err(DeviceError::Busy {
                chip: "adc",
                polls: 0,
            }))
        }
    }

    /// Shares its history so tests can inspect it after handing the
    /// indicator to the server.
    #[derive(Clone, Default)]
    pub struct MockIndicator {
        pub history: Arc<Mutex<Vec<IndicatorState>>>,
    }

    impl MockIndicator {
        pub fn states(&self) -> Vec<IndicatorState> {
            self.history.lock().unwrap().clone()
        }
    }

    impl Indicator for MockIndicator {
        fn set(&mut self, state: IndicatorState) {
            self.history.lock().unwrap().push(state);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn raw_count_to_volts() {
        assert_eq!(RawCount(0).volts(), 0.0);
        assert_eq!(RawCount(255).volts(), 5.0);
        assert_eq!(RawCount(51).volts(), 1.0);
    }
}
