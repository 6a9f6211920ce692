use crate::calibration::DEFAULT_MAX_DELAY;
use crate::common::Op;
use crate::device::{AnalogDevice, DeviceError, RawCount};
use log::{debug, warn};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug)]
pub enum OpOutcome {
    Written,
    Sampled(RawCount),
    Slept,
}

pub type OpResult = Result<OpOutcome, DeviceError>;

const OPS_PER_STEP: usize = 3;

#[derive(Debug, Error, PartialEq)]
pub enum ExecError {
    #[error("unrecognized command")]
    Unrecognized,
}

pub struct Engine {
    max_delay: Duration,
}

impl Default for Engine {
    fn default() -> Self {
        Engine::new(DEFAULT_MAX_DELAY)
    }
}

impl Engine {
    pub fn new(max_delay: Duration) -> Self {
        Engine { max_delay }
    }

    /// Runs every op in order and returns one result per op. A failing op
    /// does not stop the ones after it. A malformed batch is refused whole
    /// before anything reaches the device.
    pub async fn execute<D: AnalogDevice>(
        &self,
        device: &mut D,
        ops: &[Op],
    ) -> Result<Vec<OpResult>, ExecError> {
        self.check(ops)?;

        let mut results = Vec::with_capacity(ops.len());
        for op in ops {
            let result = match *op {
                Op::SetOutput { channel, voltage } => {
                    debug!("setting {} to channel {}", voltage, channel);
                    device
                        .write_output(channel, voltage)
                        .map(|_| OpOutcome::Written)
                }
                Op::GetInput { channel } => {
                    debug!("reading analog signal from channel {}", channel);
                    device.read_input(channel).map(OpOutcome::Sampled)
                }
                Op::Delay(duration) => {
                    tokio::time::sleep(duration).await;
                    Ok(OpOutcome::Slept)
                }
            };
            if let Err(e) = &result {
                warn!("{:?} failed ({})", op, e);
            }
            results.push(result);
        }
        Ok(results)
    }

    // Every command is a whole number of three-op steps; settle delays
    // ride along without counting.
    fn check(&self, ops: &[Op]) -> Result<(), ExecError> {
        let device_ops = ops
            .iter()
            .filter(|op| !matches!(op, Op::Delay(_)))
            .count();
        if device_ops == 0 || device_ops % OPS_PER_STEP != 0 {
            return Err(ExecError::Unrecognized);
        }
        let delays_bounded = ops.iter().all(|op| match *op {
            Op::Delay(duration) => duration <= self.max_delay,
            _ => true,
        });
        if delays_bounded {
            Ok(())
        } else {
            Err(ExecError::Unrecognized)
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::common::Volts;
    use crate::device::mock::{DeviceCall, MockDevice};
    use std::time::Instant;

    fn set(channel: u8, voltage: f64) -> Op {
        Op::SetOutput {
            channel,
            voltage: Volts::new(voltage).unwrap(),
        }
    }

    #[tokio::test]
    async fn runs_ops_in_order() {
        let mut device = MockDevice::with_samples(&[42]);
        let ops = [set(2, 0.6), Op::GetInput { channel: 0 }, set(2, 0.0)];

        let results = Engine::default().execute(&mut device, &ops).await.unwrap();

        assert_eq!(results.len(), 3);
        assert!(matches!(results[0], Ok(OpOutcome::Written)));
        assert!(matches!(results[1], Ok(OpOutcome::Sampled(RawCount(42)))));
        assert!(matches!(results[2], Ok(OpOutcome::Written)));
        assert_eq!(
            device.calls,
            vec![
                DeviceCall::Write {
                    channel: 2,
                    voltage: 0.6
                },
                DeviceCall::Read { channel: 0 },
                DeviceCall::Write {
                    channel: 2,
                    voltage: 0.0
                },
            ]
        );
    }

    #[tokio::test]
    async fn keeps_going_after_a_failure() {
        let mut device = MockDevice::default();
        let ops = [set(2, 0.6), Op::GetInput { channel: 0 }, set(2, 0.0)];

        let results = Engine::default().execute(&mut device, &ops).await.unwrap();

        assert!(results[1].is_err());
        assert_eq!(results.len(), 3);
        assert_eq!(device.calls.len(), 3);
    }

    #[tokio::test]
    async fn refuses_partial_steps() {
        let engine = Engine::default();
        let mut device = MockDevice::with_samples(&[1, 2]);

        for ops in [
            &[][..],
            &[Op::GetInput { channel: 0 }][..],
            &[set(1, 1.0), set(0, 2.25)][..],
            &[set(2, 0.6), Op::GetInput { channel: 0 }, set(2, 0.0), set(1, 1.0)][..],
            &[Op::Delay(Duration::from_millis(1))][..],
        ] {
            assert_eq!(
                engine.execute(&mut device, ops).await.unwrap_err(),
                ExecError::Unrecognized
            );
        }
        assert!(device.calls.is_empty());

        let two_steps = [
            set(1, 1.0),
            set(0, 2.25),
            set(0, 0.0),
            set(2, 0.6),
            Op::GetInput { channel: 0 },
            set(2, 0.0),
        ];
        assert_eq!(engine.execute(&mut device, &two_steps).await.unwrap().len(), 6);
    }

    #[tokio::test]
    async fn refuses_overlong_delay() {
        let engine = Engine::new(Duration::from_secs(1));
        let mut device = MockDevice::with_samples(&[1]);
        let ops = [
            set(2, 0.6),
            Op::Delay(Duration::from_secs(2)),
            Op::GetInput { channel: 0 },
            set(2, 0.0),
        ];

        assert_eq!(
            engine.execute(&mut device, &ops).await.unwrap_err(),
            ExecError::Unrecognized
        );
        assert!(device.calls.is_empty());
    }

    #[tokio::test]
    async fn delay_suspends() {
        let mut device = MockDevice::with_samples(&[1]);
        let ops = [
            set(2, 0.6),
            Op::Delay(Duration::from_millis(20)),
            Op::GetInput { channel: 0 },
            set(2, 0.0),
        ];
        let started = Instant::now();

        let results = Engine::default().execute(&mut device, &ops).await.unwrap();

        assert!(started.elapsed() >= Duration::from_millis(20));
        assert!(matches!(results[1], Ok(OpOutcome::Slept)));
        assert_eq!(device.calls.len(), 3);
    }
}
