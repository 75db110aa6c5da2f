// Hardware input - Microphone capture through a CPAL input stream
//
// Every F32/I16/U16 hardware buffer goes straight through the analyzer on the
// capture thread. On macOS (CoreAudio) the Stream is not Send, so neither is
// CpalInput.

use cpal::traits::{DeviceTrait, StreamTrait};
use cpal::{Device, FromSample, SampleFormat, SizedSample, Stream, StreamConfig};

use super::AudioInput;
use crate::audio::capture::LiveAnalyzer;
use crate::audio::device::{AudioDeviceManager, DeviceError};
use crate::config::PipelineConfig;
use crate::messaging::{
    Notification, NotificationCategory, SharedNotificationProducer, try_notify,
};

pub struct CpalInput {
    device_name: Option<String>,
    stream: Option<Stream>,
    notification_tx: Option<SharedNotificationProducer>,
}

impl CpalInput {
    /// Capture from the named device, or the default one
    pub fn new(device_name: Option<String>) -> Self {
        Self {
            device_name,
            stream: None,
            notification_tx: None,
        }
    }

    /// Capture from `config.input_device`
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.input_device.clone())
    }

    pub fn with_notifications(mut self, tx: SharedNotificationProducer) -> Self {
        self.notification_tx = Some(tx);
        self
    }

    pub fn device_name(&self) -> Option<&str> {
        self.device_name.as_deref()
    }

    fn build_stream<T>(
        device: &Device,
        config: &StreamConfig,
        analyzer: LiveAnalyzer,
        notification_tx: Option<SharedNotificationProducer>,
    ) -> Result<Stream, DeviceError>
    where
        T: SizedSample + Send + 'static,
        f32: FromSample<T>,
    {
        let stream = device.build_input_stream(
            config,
            move |data: &[T], _: &cpal::InputCallbackInfo| {
                // ========== REAL-TIME ZONE ==========
                analyzer.process(data);
            },
            move |err| {
                log::error!("Audio input stream error: {}", err);
                try_notify(
                    notification_tx.as_ref(),
                    Notification::error(
                        NotificationCategory::Capture,
                        format!("Audio input stream error: {}", err),
                    ),
                );
            },
            None,
        )?;

        Ok(stream)
    }
}

impl AudioInput for CpalInput {
    fn open(&mut self, analyzer: LiveAnalyzer) -> Result<(), DeviceError> {
        self.close();

        let manager = AudioDeviceManager::new();
        let device = manager.input_device(self.device_name.as_deref())?;
        log::info!(
            "Audio input device: {}",
            device.name().unwrap_or_else(|_| "Unknown".to_string())
        );

        let supported_config = device.default_input_config()?;
        let sample_format = supported_config.sample_format();
        log::debug!("Input config: {:?}", supported_config);
        let config: StreamConfig = supported_config.into();
        let tx = self.notification_tx.clone();

        let stream = match sample_format {
            SampleFormat::F32 => Self::build_stream::<f32>(&device, &config, analyzer, tx),
            SampleFormat::I16 => Self::build_stream::<i16>(&device, &config, analyzer, tx),
            SampleFormat::U16 => Self::build_stream::<u16>(&device, &config, analyzer, tx),
            other => Err(DeviceError::UnsupportedFormat(format!("{:?}", other))),
        }?;

        stream.play()?;
        log::info!(
            "Capture started: {} Hz, {} channel(s)",
            config.sample_rate.0,
            config.channels
        );

        self.stream = Some(stream);
        Ok(())
    }

    fn close(&mut self) {
        if let Some(stream) = self.stream.take() {
            if let Err(e) = stream.pause() {
                log::debug!("Pausing input stream before release failed: {}", e);
            }
            drop(stream);
            log::info!("Capture stopped");
        }
    }

    fn is_open(&self) -> bool {
        self.stream.is_some()
    }
}

impl Drop for CpalInput {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::haptics::ParameterSlot;
    use std::sync::Arc;

    #[test]
    fn test_device_name_comes_from_config() {
        let config = PipelineConfig {
            input_device: Some("Studio Mic".to_string()),
            ..PipelineConfig::default()
        };
        assert_eq!(CpalInput::from_config(&config).device_name(), Some("Studio Mic"));
        assert_eq!(CpalInput::from_config(&PipelineConfig::default()).device_name(), None);
    }

    #[test]
    fn test_unknown_configured_device_fails_open() {
        let config = PipelineConfig {
            input_device: Some("no-such-haptics-device".to_string()),
            ..PipelineConfig::default()
        };
        let mut input = CpalInput::from_config(&config);
        let analyzer = LiveAnalyzer::new(Arc::new(ParameterSlot::new()));

        assert!(matches!(input.open(analyzer), Err(DeviceError::NotFound(_))));
        assert!(!input.is_open());
    }
}
