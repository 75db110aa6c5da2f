// Pipeline - Load/start/stop controller tying sources, pages and haptics together

pub mod controller;

pub use controller::HapticPipeline;

use std::fmt;

use thiserror::Error;

use crate::audio::output::OutputError;
use crate::config::ConfigError;
use crate::decoder::DecodeError;
use crate::haptics::ActuatorError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Uninitialized,
    Loaded,
    Running,
    Stopped,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineState::Uninitialized => "uninitialized",
            PipelineState::Loaded => "loaded",
            PipelineState::Running => "running",
            PipelineState::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to load audio: {0}")]
    Decode(#[from] DecodeError),

    #[error("Haptic engine initialization failed: {0}")]
    ActuatorInit(#[source] ActuatorError),

    #[error("Audio output error: {0}")]
    Output(#[from] OutputError),

    #[error("Cannot {action} a pipeline that is {from}")]
    InvalidTransition {
        from: PipelineState,
        action: &'static str,
    },
}

/// Hands out pages on the caller's thread
///
/// Hosts that run their own timeline call this once per page instead of
/// registering the render callback with an output.
pub trait SignalProvider {
    /// Copy of the next page (empty when nothing is loaded)
    fn get_signal(&self) -> Vec<f32>;
}
