// Haptics - Actuator contract and parameter delivery
//
// The actuator itself (platform haptic engine) is an external collaborator.
// This module defines what the pipeline needs from it and how derived
// parameters reach it without touching the real-time thread.

pub mod channel;
pub mod recording;
pub mod slot;
pub mod state;

pub use channel::HapticChannel;
pub use recording::{ActuatorCall, ActuatorLog, NullActuator, RecordingActuator};
pub use slot::ParameterSlot;
pub use state::{AtomicEngineState, EngineState};

use std::fmt;

use thiserror::Error;

use crate::analysis::HapticParameters;

/// Relative time meaning "as soon as possible"
pub const TIME_IMMEDIATE: f64 = 0.0;

/// Actuator-related errors
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ActuatorError {
    #[error("Haptic engine creation failed: {0}")]
    EngineCreation(String),

    #[error("Haptic player start failed: {0}")]
    Start(String),

    #[error("Haptic parameter send failed: {0}")]
    Send(String),

    #[error("Haptic player stop failed: {0}")]
    Stop(String),

    #[error("Haptic feedback is not supported on this device")]
    Unsupported,
}

pub type ActuatorResult<T> = Result<T, ActuatorError>;

/// Why the platform engine stopped on its own
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorStopReason {
    AudioSessionInterrupt,
    ApplicationSuspended,
    IdleTimeout,
    SystemError,
    PlaybackFinished,
    EngineDestroyed,
    ControllerDisconnected,
    Unknown,
}

impl fmt::Display for ActuatorStopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            ActuatorStopReason::AudioSessionInterrupt => "audio session interrupted",
            ActuatorStopReason::ApplicationSuspended => "application suspended",
            ActuatorStopReason::IdleTimeout => "idle timeout",
            ActuatorStopReason::SystemError => "system error",
            ActuatorStopReason::PlaybackFinished => "playback finished",
            ActuatorStopReason::EngineDestroyed => "engine destroyed",
            ActuatorStopReason::ControllerDisconnected => "game controller disconnected",
            ActuatorStopReason::Unknown => "unknown reason",
        };
        f.write_str(reason)
    }
}

/// Continuous haptic event the player is created with
///
/// Parameter updates modulate this event while it plays.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContinuousPattern {
    pub initial_intensity: f32,
    pub initial_sharpness: f32,
    pub duration_secs: f64,
}

impl Default for ContinuousPattern {
    fn default() -> Self {
        Self {
            initial_intensity: 1.0,
            initial_sharpness: 0.6,
            duration_secs: 100.0,
        }
    }
}

/// Haptic rendering engine with a continuous player
///
/// Calls come from the controller thread (prepare/start/stop) and from the
/// dispatcher thread (send_parameters), never from the audio callback.
pub trait Actuator: Send {
    /// Whether the device can render haptics at all
    fn supports_haptic_feedback(&self) -> bool;

    /// Create the engine and its continuous player
    fn prepare(&mut self, _pattern: &ContinuousPattern) -> ActuatorResult<()> {
        Ok(())
    }

    /// Start the continuous player at `at_time` (relative seconds)
    fn start(&mut self, at_time: f64) -> ActuatorResult<()>;

    /// Update intensity/sharpness of the running player
    fn send_parameters(&mut self, parameters: HapticParameters, at_time: f64)
    -> ActuatorResult<()>;

    /// Stop the player and the engine
    fn stop(&mut self) -> ActuatorResult<()>;
}
