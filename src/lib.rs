// Audio haptics - Audio signal to haptic actuator parameters

pub mod analysis;
pub mod audio;
pub mod config;
pub mod decoder;
pub mod haptics;
pub mod messaging;
pub mod pipeline;

// Re-export commonly used types for convenience
pub use analysis::{DerivationStrategy, HapticParameters};
pub use audio::capture::{CaptureError, CaptureSession, LiveAnalyzer};
pub use audio::device::{AudioDeviceManager, DeviceError};
pub use audio::input::{AudioInput, CpalInput, ManualCaptureHandle, ManualInput};
pub use audio::output::{
    AudioOutput, CpalOutput, ManualOutput, ManualRenderHandle, OutputError, RenderCallback,
    TimerOutput,
};
pub use audio::page::{DEFAULT_PAGE_SIZE, PageBuffer, SharedPageBuffer};
pub use audio::sample_buffer::SampleBuffer;
pub use config::{ConfigError, PipelineConfig};
pub use decoder::{DecodeError, MediaFile, PcmSource, SampleSource};
pub use haptics::{
    Actuator, ActuatorError, ActuatorStopReason, ContinuousPattern, EngineState, NullActuator,
    RecordingActuator,
};
pub use messaging::{Notification, create_notification_channel};
pub use pipeline::{HapticPipeline, PipelineError, PipelineState, SignalProvider};
