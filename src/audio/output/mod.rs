// Audio output - Where the render callback gets registered
//
// The pipeline hands a RenderCallback to an AudioOutput on start() and takes
// it back on stop(). The output decides which thread invokes it: the cpal
// real-time thread, a pacing thread, or the host's own audio engine.

pub mod hardware;
pub mod timer;

pub use hardware::CpalOutput;
pub use timer::TimerOutput;

use std::sync::{Arc, Mutex};

use thiserror::Error;

use crate::audio::device::DeviceError;

/// Fills a mono buffer. Must not allocate, block or do I/O.
pub type RenderCallback = Box<dyn FnMut(&mut [f32]) + Send + 'static>;

#[derive(Debug, Error)]
pub enum OutputError {
    #[error(transparent)]
    Device(#[from] DeviceError),

    #[error("Failed to spawn render thread: {0}")]
    Thread(#[from] std::io::Error),
}

pub trait AudioOutput {
    /// Install the callback and start invoking it. Replaces any previous one.
    fn register(&mut self, callback: RenderCallback) -> Result<(), OutputError>;

    /// Stop invoking the callback and drop it. Must be synchronous and
    /// idempotent: once it returns, the callback is never called again.
    fn release(&mut self);

    /// Rate the callback is driven at, if the output knows it
    fn sample_rate(&self) -> Option<u32> {
        None
    }
}

/// Output driven by the host, which calls [`ManualRenderHandle::render`]
/// from its own audio callback (or from tests)
#[derive(Default)]
pub struct ManualOutput {
    slot: Arc<Mutex<Option<RenderCallback>>>,
}

/// Cloneable handle used to pull audio out of a [`ManualOutput`]
#[derive(Clone)]
pub struct ManualRenderHandle {
    slot: Arc<Mutex<Option<RenderCallback>>>,
}

impl ManualOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&self) -> ManualRenderHandle {
        ManualRenderHandle {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl AudioOutput for ManualOutput {
    fn register(&mut self, callback: RenderCallback) -> Result<(), OutputError> {
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        *slot = Some(callback);
        Ok(())
    }

    fn release(&mut self) {
        // Taking the lock waits for an in-flight render to finish
        let old = self.slot.lock().unwrap_or_else(|e| e.into_inner()).take();
        drop(old);
    }
}

impl ManualRenderHandle {
    /// Run the registered callback on `out`
    ///
    /// Returns false (and leaves `out` silent) when nothing is registered or
    /// the output is being reconfigured.
    pub fn render(&self, out: &mut [f32]) -> bool {
        if let Ok(mut slot) = self.slot.try_lock()
            && let Some(callback) = slot.as_mut()
        {
            callback(out);
            return true;
        }
        out.fill(0.0);
        false
    }

    pub fn is_registered(&self) -> bool {
        self.slot
            .lock()
            .map(|slot| slot.is_some())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_output_runs_callback() {
        let mut output = ManualOutput::new();
        let handle = output.handle();
        let mut buf = [1.0f32; 8];

        assert!(!handle.render(&mut buf));
        assert_eq!(buf, [0.0; 8]);

        output
            .register(Box::new(|out: &mut [f32]| out.fill(0.5)))
            .unwrap();
        assert!(handle.is_registered());
        assert!(handle.render(&mut buf));
        assert_eq!(buf, [0.5; 8]);

        output.release();
        output.release();
        assert!(!handle.is_registered());
        assert!(!handle.render(&mut buf));
    }
}
