// Pipeline configuration - JSON-backed settings with validation

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::analysis::DerivationStrategy;
use crate::audio::page::DEFAULT_PAGE_SIZE;
use crate::haptics::ContinuousPattern;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Samples per page
    pub page_size: usize,
    pub strategy: DerivationStrategy,

    // Continuous event the haptic player is primed with
    pub initial_intensity: f32,
    pub initial_sharpness: f32,
    pub pattern_duration_secs: f64,

    /// How often the dispatcher polls for new parameters
    pub dispatch_interval_ms: u64,

    /// Fail `load` when the haptic engine cannot be created
    pub require_haptics: bool,

    /// Device names; None selects the system default
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_device: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_device: Option<String>,

    pub notification_capacity: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let pattern = ContinuousPattern::default();
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            strategy: DerivationStrategy::default(),
            initial_intensity: pattern.initial_intensity,
            initial_sharpness: pattern.initial_sharpness,
            pattern_duration_secs: pattern.duration_secs,
            dispatch_interval_ms: 5,
            require_haptics: false,
            output_device: None,
            input_device: None,
            notification_capacity: 256,
        }
    }
}

impl PipelineConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        log::debug!("Loading pipeline config from {}", path.display());
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 {
            return Err(ConfigError::Invalid(
                "page_size must be at least 1".to_string(),
            ));
        }

        for (name, value) in [
            ("initial_intensity", self.initial_intensity),
            ("initial_sharpness", self.initial_sharpness),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Invalid(format!(
                    "{} must be between 0 and 1, got {}",
                    name, value
                )));
            }
        }

        if !self.pattern_duration_secs.is_finite() || self.pattern_duration_secs <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "pattern_duration_secs must be positive, got {}",
                self.pattern_duration_secs
            )));
        }

        if self.dispatch_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "dispatch_interval_ms must be at least 1".to_string(),
            ));
        }

        if self.notification_capacity == 0 {
            return Err(ConfigError::Invalid(
                "notification_capacity must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    pub fn pattern(&self) -> ContinuousPattern {
        ContinuousPattern {
            initial_intensity: self.initial_intensity,
            initial_sharpness: self.initial_sharpness,
            duration_secs: self.pattern_duration_secs,
        }
    }

    /// Dispatcher poll period, never below 1 ms even if `validate` was skipped
    pub fn dispatch_interval(&self) -> Duration {
        Duration::from_millis(self.dispatch_interval_ms.max(1))
    }
}
