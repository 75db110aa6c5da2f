// Audio devices - CPAL device lookup for capture and render

use cpal::traits::{DeviceTrait, HostTrait};
use cpal::{Device, Host};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("No default {0} device available")]
    NoDefaultDevice(&'static str),

    #[error("Audio device not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(#[from] cpal::DefaultStreamConfigError),

    #[error("Error in stream creation: {0}")]
    Build(#[from] cpal::BuildStreamError),

    #[error("Error in stream start: {0}")]
    Play(#[from] cpal::PlayStreamError),

    #[error("Unsupported sample format: {0}. Supported formats: F32, I16, U16")]
    UnsupportedFormat(String),
}

#[derive(Clone, Debug)]
pub struct AudioDeviceInfo {
    pub name: String,
    pub is_default: bool,
}

pub struct AudioDeviceManager {
    host: Host,
}

impl AudioDeviceManager {
    pub fn new() -> Self {
        Self {
            host: cpal::default_host(),
        }
    }

    /// Output devices (render bridge targets)
    pub fn list_output_devices(&self) -> Vec<AudioDeviceInfo> {
        let default_name = self
            .host
            .default_output_device()
            .and_then(|d| d.name().ok());
        match self.host.output_devices() {
            Ok(devices) => describe(devices, default_name),
            Err(e) => {
                log::warn!("Failed to enumerate output devices: {}", e);
                Vec::new()
            }
        }
    }

    /// Input devices (microphones)
    pub fn list_input_devices(&self) -> Vec<AudioDeviceInfo> {
        let default_name = self
            .host
            .default_input_device()
            .and_then(|d| d.name().ok());
        match self.host.input_devices() {
            Ok(devices) => describe(devices, default_name),
            Err(e) => {
                log::warn!("Failed to enumerate input devices: {}", e);
                Vec::new()
            }
        }
    }

    /// Named output device, or the default one when `name` is None
    pub fn output_device(&self, name: Option<&str>) -> Result<Device, DeviceError> {
        match name {
            None => self
                .host
                .default_output_device()
                .ok_or(DeviceError::NoDefaultDevice("output")),
            Some(name) => self
                .host
                .output_devices()
                .ok()
                .and_then(|mut devices| find_by_name(&mut devices, name))
                .ok_or_else(|| DeviceError::NotFound(name.to_string())),
        }
    }

    /// Named input device, or the default one when `name` is None
    pub fn input_device(&self, name: Option<&str>) -> Result<Device, DeviceError> {
        match name {
            None => self
                .host
                .default_input_device()
                .ok_or(DeviceError::NoDefaultDevice("input")),
            Some(name) => self
                .host
                .input_devices()
                .ok()
                .and_then(|mut devices| find_by_name(&mut devices, name))
                .ok_or_else(|| DeviceError::NotFound(name.to_string())),
        }
    }
}

impl Default for AudioDeviceManager {
    fn default() -> Self {
        Self::new()
    }
}

fn describe(
    devices: impl Iterator<Item = Device>,
    default_name: Option<String>,
) -> Vec<AudioDeviceInfo> {
    devices
        .filter_map(|device| device.name().ok())
        .map(|name| AudioDeviceInfo {
            is_default: default_name.as_deref() == Some(name.as_str()),
            name,
        })
        .collect()
}

fn find_by_name(devices: &mut impl Iterator<Item = Device>, name: &str) -> Option<Device> {
    devices.find(|device| device.name().map(|n| n == name).unwrap_or(false))
}
