// Timer output - Headless periodic page delivery
//
// Drives the render callback from a dedicated thread at the pace a real device
// would (`frames / sample_rate` per call) and discards the audio. Used when
// haptics should follow the page cadence without any audio hardware, e.g.
// alongside a video player that renders its own sound.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use super::{AudioOutput, OutputError, RenderCallback};

pub struct TimerOutput {
    sample_rate: u32,
    frames_per_tick: usize,
    running: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl TimerOutput {
    pub fn new(sample_rate: u32, frames_per_tick: usize) -> Self {
        Self {
            sample_rate: sample_rate.max(1),
            frames_per_tick: frames_per_tick.max(1),
            running: Arc::new(AtomicBool::new(false)),
            thread: None,
        }
    }

    /// Time between two callback invocations
    pub fn period(&self) -> Duration {
        Duration::from_secs_f64(self.frames_per_tick as f64 / self.sample_rate as f64)
    }

    /// Adopt the rate of the loaded material (takes effect on next register)
    pub fn set_sample_rate(&mut self, sample_rate: u32) {
        self.sample_rate = sample_rate.max(1);
    }
}

impl AudioOutput for TimerOutput {
    fn register(&mut self, mut callback: RenderCallback) -> Result<(), OutputError> {
        self.release();

        let period = self.period();
        let frames = self.frames_per_tick;
        self.running.store(true, Ordering::Release);
        let running = Arc::clone(&self.running);

        let handle = thread::Builder::new()
            .name("page-timer".to_string())
            .spawn(move || {
                let mut buffer = vec![0.0f32; frames];
                let mut next_tick = Instant::now();
                while running.load(Ordering::Acquire) {
                    callback(&mut buffer);

                    // Absolute deadlines so the cadence does not drift
                    next_tick += period;
                    let now = Instant::now();
                    if next_tick > now {
                        thread::sleep(next_tick - now);
                    } else {
                        next_tick = now;
                    }
                }
            });

        match handle {
            Ok(handle) => {
                self.thread = Some(handle);
                log::debug!("Page timer started, period {:?}", period);
                Ok(())
            }
            Err(e) => {
                self.running.store(false, Ordering::Release);
                Err(e.into())
            }
        }
    }

    fn release(&mut self) {
        self.running.store(false, Ordering::Release);
        if let Some(handle) = self.thread.take() {
            if handle.join().is_err() {
                log::error!("Page timer thread panicked");
            }
            log::debug!("Page timer stopped");
        }
    }

    fn sample_rate(&self) -> Option<u32> {
        Some(self.sample_rate)
    }
}

impl Drop for TimerOutput {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_period() {
        let output = TimerOutput::new(48000, 480);
        assert!((output.period().as_secs_f64() - 0.010).abs() < 1e-9);
    }

    #[test]
    fn test_invokes_callback_until_released() {
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = Arc::clone(&calls);
        let mut output = TimerOutput::new(48000, 48); // 1ms period

        output
            .register(Box::new(move |buf: &mut [f32]| {
                assert_eq!(buf.len(), 48);
                calls_clone.fetch_add(1, Ordering::Relaxed);
            }))
            .unwrap();
        thread::sleep(Duration::from_millis(50));
        output.release();

        let after_release = calls.load(Ordering::Relaxed);
        assert!(after_release > 0);

        thread::sleep(Duration::from_millis(20));
        assert_eq!(calls.load(Ordering::Relaxed), after_release);
    }
}
