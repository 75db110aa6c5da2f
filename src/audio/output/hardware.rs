// Hardware output - Render callback driven by a CPAL output stream
//
// The device's preferred sample format is detected and a matching stream is
// built. The callback renders mono f32 into a preallocated scratch buffer
// which is then fanned out to every channel with format conversion, without
// allocating.
//
// On macOS (CoreAudio) the Stream is not Send, so neither is CpalOutput.

use cpal::traits::{DeviceTrait, StreamTrait};
use cpal::{Device, FromSample, Sample, SampleFormat, SizedSample, Stream, StreamConfig};

use super::{AudioOutput, OutputError, RenderCallback};
use crate::audio::device::{AudioDeviceManager, DeviceError};
use crate::config::PipelineConfig;
use crate::messaging::{
    Notification, NotificationCategory, SharedNotificationProducer, try_notify,
};

/// Frames rendered per callback invocation; larger hardware buffers are split
pub const MAX_RENDER_FRAMES: usize = 4096;

pub struct CpalOutput {
    device_name: Option<String>,
    stream: Option<Stream>,
    sample_rate: Option<u32>,
    notification_tx: Option<SharedNotificationProducer>,
}

impl CpalOutput {
    /// Output on the named device, or the default one
    pub fn new(device_name: Option<String>) -> Self {
        Self {
            device_name,
            stream: None,
            sample_rate: None,
            notification_tx: None,
        }
    }

    /// Output on `config.output_device`
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.output_device.clone())
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
        mut callback: RenderCallback,
        notification_tx: Option<SharedNotificationProducer>,
    ) -> Result<Stream, DeviceError>
    where
        T: SizedSample + FromSample<f32> + Send + 'static,
    {
        let channels = config.channels.max(1) as usize;
        let mut scratch = vec![0.0f32; MAX_RENDER_FRAMES];

        let stream = device.build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                // ========== REAL-TIME ZONE ==========
                // No allocations, no I/O, no blocking locks
                for block in data.chunks_mut(channels * MAX_RENDER_FRAMES) {
                    let frames = block.len() / channels;
                    let mono = &mut scratch[..frames];
                    callback(mono);
                    for (frame, sample) in block.chunks_mut(channels).zip(mono.iter()) {
                        write_mono_to_interleaved_frame(*sample, frame);
                    }
                }
                // ========== REAL-TIME ZONE END ==========
            },
            move |err| {
                // Runs outside the audio callback, so I/O is fine here
                log::error!("Audio output stream error: {}", err);
                try_notify(
                    notification_tx.as_ref(),
                    Notification::error(
                        NotificationCategory::Output,
                        format!("Audio output stream error: {}", err),
                    ),
                );
            },
            None,
        )?;

        Ok(stream)
    }
}

/// Write one mono sample to every channel of an interleaved frame
#[inline]
pub fn write_mono_to_interleaved_frame<T>(sample: f32, frame: &mut [T])
where
    T: Sample + FromSample<f32>,
{
    let converted = T::from_sample(sample);
    for channel_sample in frame.iter_mut() {
        *channel_sample = converted;
    }
}

impl AudioOutput for CpalOutput {
    fn register(&mut self, callback: RenderCallback) -> Result<(), OutputError> {
        self.release();

        let manager = AudioDeviceManager::new();
        let device = manager.output_device(self.device_name.as_deref())?;
        log::info!(
            "Audio output device: {}",
            device.name().unwrap_or_else(|_| "Unknown".to_string())
        );

        let supported_config = device
            .default_output_config()
            .map_err(DeviceError::from)?;
        let sample_format = supported_config.sample_format();
        let sample_rate = supported_config.sample_rate().0;
        log::debug!("Output config: {:?}", supported_config);

        let config: StreamConfig = supported_config.into();
        let tx = self.notification_tx.clone();

        let stream = match sample_format {
            SampleFormat::F32 => Self::build_stream::<f32>(&device, &config, callback, tx),
            SampleFormat::I16 => Self::build_stream::<i16>(&device, &config, callback, tx),
            SampleFormat::U16 => Self::build_stream::<u16>(&device, &config, callback, tx),
            other => Err(DeviceError::UnsupportedFormat(format!("{:?}", other))),
        }?;

        stream.play().map_err(DeviceError::from)?;
        log::info!(
            "Audio output started: {} Hz, {} channel(s)",
            sample_rate,
            config.channels
        );

        self.stream = Some(stream);
        self.sample_rate = Some(sample_rate);
        Ok(())
    }

    fn release(&mut self) {
        // Dropping the stream stops it and frees the callback before returning
        if let Some(stream) = self.stream.take() {
            if let Err(e) = stream.pause() {
                log::debug!("Pausing output stream before release failed: {}", e);
            }
            drop(stream);
            log::info!("Audio output released");
        }
        self.sample_rate = None;
    }

    fn sample_rate(&self) -> Option<u32> {
        self.sample_rate
    }
}

impl Drop for CpalOutput {
    fn drop(&mut self) {
        self.release();
    }
}
