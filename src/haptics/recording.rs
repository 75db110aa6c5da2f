// Reference actuators
//
// RecordingActuator keeps every call in a shared log, which makes it usable as
// an offline sink and as a test double. NullActuator stands in for devices
// without haptic hardware.

use std::sync::{Arc, Mutex};

use super::{Actuator, ActuatorError, ActuatorResult, ContinuousPattern};
use crate::analysis::HapticParameters;

#[derive(Debug, Clone, PartialEq)]
pub enum ActuatorCall {
    Prepare(ContinuousPattern),
    Start { at_time: f64 },
    Send { parameters: HapticParameters, at_time: f64 },
    Stop,
}

/// Shared handle on the calls recorded by a [`RecordingActuator`]
#[derive(Clone, Default)]
pub struct ActuatorLog {
    calls: Arc<Mutex<Vec<ActuatorCall>>>,
}

impl ActuatorLog {
    fn push(&self, call: ActuatorCall) {
        let mut calls = self.calls.lock().unwrap_or_else(|e| e.into_inner());
        calls.push(call);
    }

    pub fn calls(&self) -> Vec<ActuatorCall> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Parameters that were successfully sent, in order
    pub fn sent_parameters(&self) -> Vec<HapticParameters> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                ActuatorCall::Send { parameters, .. } => Some(parameters),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, predicate: impl Fn(&ActuatorCall) -> bool) -> usize {
        self.calls().iter().filter(|c| predicate(c)).count()
    }
}

/// Actuator that records calls instead of driving hardware
pub struct RecordingActuator {
    log: ActuatorLog,
    supported: bool,
    fail_prepare: bool,
    fail_start: bool,
    fail_sends: bool,
}

impl RecordingActuator {
    pub fn new() -> Self {
        Self {
            log: ActuatorLog::default(),
            supported: true,
            fail_prepare: false,
            fail_start: false,
            fail_sends: false,
        }
    }

    /// Report haptics as unsupported
    pub fn unsupported(mut self) -> Self {
        self.supported = false;
        self
    }

    /// Make `prepare` fail like an engine that cannot be created
    pub fn failing_prepare(mut self) -> Self {
        self.fail_prepare = true;
        self
    }

    pub fn failing_start(mut self) -> Self {
        self.fail_start = true;
        self
    }

    /// Make every `send_parameters` fail (nothing is recorded for them)
    pub fn failing_sends(mut self) -> Self {
        self.fail_sends = true;
        self
    }

    pub fn log(&self) -> ActuatorLog {
        self.log.clone()
    }
}

impl Default for RecordingActuator {
    fn default() -> Self {
        Self::new()
    }
}

impl Actuator for RecordingActuator {
    fn supports_haptic_feedback(&self) -> bool {
        self.supported
    }

    fn prepare(&mut self, pattern: &ContinuousPattern) -> ActuatorResult<()> {
        if self.fail_prepare {
            return Err(ActuatorError::EngineCreation(
                "recording actuator configured to fail".to_string(),
            ));
        }
        self.log.push(ActuatorCall::Prepare(*pattern));
        Ok(())
    }

    fn start(&mut self, at_time: f64) -> ActuatorResult<()> {
        if self.fail_start {
            return Err(ActuatorError::Start(
                "recording actuator configured to fail".to_string(),
            ));
        }
        self.log.push(ActuatorCall::Start { at_time });
        Ok(())
    }

    fn send_parameters(
        &mut self,
        parameters: HapticParameters,
        at_time: f64,
    ) -> ActuatorResult<()> {
        if self.fail_sends {
            return Err(ActuatorError::Send(
                "recording actuator configured to fail".to_string(),
            ));
        }
        self.log.push(ActuatorCall::Send {
            parameters,
            at_time,
        });
        Ok(())
    }

    fn stop(&mut self) -> ActuatorResult<()> {
        self.log.push(ActuatorCall::Stop);
        Ok(())
    }
}

/// Actuator for devices without haptic support
#[derive(Debug, Default, Clone, Copy)]
pub struct NullActuator;

impl Actuator for NullActuator {
    fn supports_haptic_feedback(&self) -> bool {
        false
    }

    fn start(&mut self, _at_time: f64) -> ActuatorResult<()> {
        Err(ActuatorError::Unsupported)
    }

    fn send_parameters(
        &mut self,
        _parameters: HapticParameters,
        _at_time: f64,
    ) -> ActuatorResult<()> {
        Err(ActuatorError::Unsupported)
    }

    fn stop(&mut self) -> ActuatorResult<()> {
        Ok(())
    }
}
