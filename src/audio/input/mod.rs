// Audio input - Where captured buffers enter the live analyzer
//
// A CaptureSession opens an AudioInput with the analyzer and closes it before
// the haptics are stopped. The input decides which thread feeds the analyzer:
// the cpal capture thread, or the host's own capture session.

pub mod hardware;

pub use hardware::CpalInput;

use std::sync::{Arc, Mutex};

use cpal::{FromSample, Sample};

use crate::audio::capture::LiveAnalyzer;
use crate::audio::device::DeviceError;

pub trait AudioInput {
    /// Start feeding captured buffers to `analyzer`. Replaces any previous one.
    fn open(&mut self, analyzer: LiveAnalyzer) -> Result<(), DeviceError>;

    /// Stop capturing and drop the analyzer. Synchronous and idempotent: once
    /// it returns, the analyzer is never called again.
    fn close(&mut self);

    fn is_open(&self) -> bool;
}

/// Input fed by the host through [`ManualCaptureHandle::push`]
#[derive(Default)]
pub struct ManualInput {
    analyzer: Arc<Mutex<Option<LiveAnalyzer>>>,
}

/// Cloneable handle the host pushes captured buffers through
#[derive(Clone)]
pub struct ManualCaptureHandle {
    analyzer: Arc<Mutex<Option<LiveAnalyzer>>>,
}

impl ManualInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&self) -> ManualCaptureHandle {
        ManualCaptureHandle {
            analyzer: Arc::clone(&self.analyzer),
        }
    }
}

impl AudioInput for ManualInput {
    fn open(&mut self, analyzer: LiveAnalyzer) -> Result<(), DeviceError> {
        *self.analyzer.lock().unwrap_or_else(|e| e.into_inner()) = Some(analyzer);
        Ok(())
    }

    fn close(&mut self) {
        // Waits for an in-flight push
        let old = self
            .analyzer
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        drop(old);
    }

    fn is_open(&self) -> bool {
        self.analyzer
            .lock()
            .map(|analyzer| analyzer.is_some())
            .unwrap_or(false)
    }
}

impl ManualCaptureHandle {
    /// Analyze one captured buffer
    ///
    /// Returns false when the input is closed or being reconfigured.
    pub fn push<T>(&self, data: &[T]) -> bool
    where
        T: Sample,
        f32: FromSample<T>,
    {
        if let Ok(analyzer) = self.analyzer.try_lock()
            && let Some(analyzer) = analyzer.as_ref()
        {
            analyzer.process(data);
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::haptics::ParameterSlot;

    #[test]
    fn test_manual_input_feeds_analyzer_until_closed() {
        let slot = Arc::new(ParameterSlot::new());
        let mut input = ManualInput::new();
        let handle = input.handle();

        assert!(!handle.push(&[0.5f32; 16]));
        assert!(!input.is_open());

        input.open(LiveAnalyzer::new(Arc::clone(&slot))).unwrap();
        assert!(input.is_open());
        assert!(handle.push(&[0.5f32; 16]));
        assert_eq!(slot.sequence(), 1);

        input.close();
        input.close();
        assert!(!handle.push(&[0.5f32; 16]));
        assert_eq!(slot.sequence(), 1);
    }
}
