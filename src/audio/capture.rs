// Live capture - Microphone buffers straight to haptic parameters
//
// Every captured buffer is reduced to its mean absolute amplitude
// (whole-buffer derivation) and published to the haptic channel's slot. The
// page buffer is not involved on this path.

use thiserror::Error;

use std::sync::Arc;

use cpal::{FromSample, Sample};

use crate::analysis::whole_buffer_from;
use crate::audio::device::DeviceError;
use crate::audio::input::{AudioInput, CpalInput};
use crate::config::{ConfigError, PipelineConfig};
use crate::haptics::{
    Actuator, ActuatorError, ActuatorStopReason, EngineState, HapticChannel, ParameterSlot,
};
use crate::messaging::SharedNotificationProducer;

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Device(#[from] DeviceError),

    #[error("Haptic engine initialization failed: {0}")]
    ActuatorInit(#[source] ActuatorError),
}

/// Reduces incoming capture buffers to haptic parameters
#[derive(Clone)]
pub struct LiveAnalyzer {
    slot: Arc<ParameterSlot>,
}

impl LiveAnalyzer {
    pub fn new(slot: Arc<ParameterSlot>) -> Self {
        Self { slot }
    }

    /// Analyze one hardware buffer (real-time safe)
    ///
    /// Empty buffers are ignored rather than published as silence.
    #[inline]
    pub fn process<T>(&self, data: &[T])
    where
        T: Sample,
        f32: FromSample<T>,
    {
        if data.is_empty() {
            return;
        }
        let parameters = whole_buffer_from(data.iter().map(|s| s.to_sample::<f32>()));
        self.slot.publish(parameters);
    }
}

/// Capture session feeding an actuator
///
/// Stopping (or dropping) the session closes the input before the haptics,
/// so no capture callback can outlive the state it publishes into.
pub struct CaptureSession<A: Actuator + 'static, I: AudioInput = CpalInput> {
    input: I,
    haptics: HapticChannel<A>,
}

impl<A: Actuator + 'static> CaptureSession<A, CpalInput> {
    /// Prime the actuator and capture from `config.input_device`
    pub fn start(config: &PipelineConfig, actuator: A) -> Result<Self, CaptureError> {
        Self::with_input(config, actuator, CpalInput::from_config(config), None)
    }

    pub fn start_with_notifications(
        config: &PipelineConfig,
        actuator: A,
        notification_tx: SharedNotificationProducer,
    ) -> Result<Self, CaptureError> {
        let input = CpalInput::from_config(config).with_notifications(Arc::clone(&notification_tx));
        Self::with_input(config, actuator, input, Some(notification_tx))
    }
}

impl<A: Actuator + 'static, I: AudioInput> CaptureSession<A, I> {
    /// Validate the config, prime the actuator and open `input`
    pub fn with_input(
        config: &PipelineConfig,
        actuator: A,
        mut input: I,
        notification_tx: Option<SharedNotificationProducer>,
    ) -> Result<Self, CaptureError> {
        config.validate()?;

        let mut haptics = HapticChannel::new(actuator, config.dispatch_interval());
        if let Some(tx) = notification_tx {
            haptics.set_notifications(tx);
        }
        haptics
            .prime(&config.pattern())
            .map_err(CaptureError::ActuatorInit)?;

        // Dispatcher first, so the first captured buffer is not treated as stale
        haptics.start();
        input.open(LiveAnalyzer::new(haptics.slot()))?;

        Ok(Self { input, haptics })
    }

    pub fn engine_state(&self) -> EngineState {
        self.haptics.state()
    }

    pub fn is_capturing(&self) -> bool {
        self.input.is_open()
    }

    /// Platform engine was reset: restart the player if it was running
    pub fn handle_actuator_reset(&mut self) {
        self.haptics.handle_reset();
    }

    pub fn handle_actuator_stopped(&self, reason: ActuatorStopReason) {
        self.haptics.handle_stopped(reason);
    }

    /// Close the input, then stop the haptics. Idempotent.
    pub fn stop(&mut self) {
        self.input.close();
        self.haptics.stop();
    }
}

impl<A: Actuator + 'static, I: AudioInput> Drop for CaptureSession<A, I> {
    fn drop(&mut self) {
        self.stop();
    }
}
