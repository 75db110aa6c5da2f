// Haptic pipeline - Owns the page buffer, the haptic channel and the output
//
// Thread model:
// - Controller (caller) thread: load / start / stop / reset / get_signal
// - Output thread: PageRenderer pulls pages through try_lock
// - Dispatcher thread: forwards the latest parameters to the actuator
//
// Buffers are swapped under the page lock and dropped after it is released.

use std::sync::{Arc, MutexGuard};

use super::{PipelineError, PipelineState, SignalProvider};
use crate::audio::output::AudioOutput;
use crate::audio::page::{PageBuffer, SharedPageBuffer};
use crate::audio::render::PageRenderer;
use crate::config::PipelineConfig;
use crate::decoder::SampleSource;
use crate::haptics::{Actuator, ActuatorStopReason, EngineState, HapticChannel};
use crate::messaging::{
    Notification, NotificationCategory, SharedNotificationProducer, try_notify,
};

fn lock_pages(pages: &SharedPageBuffer) -> MutexGuard<'_, PageBuffer> {
    pages.lock().unwrap_or_else(|e| e.into_inner())
}

pub struct HapticPipeline<A: Actuator + 'static, O: AudioOutput> {
    config: PipelineConfig,
    pages: SharedPageBuffer,
    haptics: HapticChannel<A>,
    output: O,
    state: PipelineState,
    notification_tx: Option<SharedNotificationProducer>,
}

impl<A: Actuator + 'static, O: AudioOutput> HapticPipeline<A, O> {
    /// Build a pipeline from an unchecked config
    ///
    /// Prefer [`HapticPipeline::try_new`] for configs that did not come
    /// through `PipelineConfig::from_json_str`.
    pub fn new(config: PipelineConfig, actuator: A, output: O) -> Self {
        let pages = PageBuffer::shared(config.page_size);
        let haptics = HapticChannel::new(actuator, config.dispatch_interval());

        Self {
            config,
            pages,
            haptics,
            output,
            state: PipelineState::Uninitialized,
            notification_tx: None,
        }
    }

    /// Validate `config`, then build the pipeline
    pub fn try_new(config: PipelineConfig, actuator: A, output: O) -> Result<Self, PipelineError> {
        config.validate()?;
        Ok(Self::new(config, actuator, output))
    }

    /// Report decode, actuator and output problems on a notification channel
    pub fn with_notifications(mut self, tx: SharedNotificationProducer) -> Self {
        self.haptics.set_notifications(Arc::clone(&tx));
        self.notification_tx = Some(tx);
        self
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn engine_state(&self) -> EngineState {
        self.haptics.state()
    }

    /// Whether parameter updates currently reach the actuator
    pub fn haptics_enabled(&self) -> bool {
        self.haptics.is_enabled()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn page_buffer(&self) -> SharedPageBuffer {
        Arc::clone(&self.pages)
    }

    /// Rate of the loaded material, None when nothing is loaded
    pub fn sample_rate(&self) -> Option<u32> {
        let pages = lock_pages(&self.pages);
        (!pages.is_empty()).then(|| pages.samples().sample_rate())
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    pub fn output_mut(&mut self) -> &mut O {
        &mut self.output
    }

    /// Decode `source`, rewind and prime the haptic engine
    ///
    /// Loading while running stops first. On error nothing stays loaded and
    /// the pipeline is Uninitialized or Stopped.
    pub fn load(&mut self, source: &dyn SampleSource) -> Result<(), PipelineError> {
        if self.state == PipelineState::Running {
            log::info!("Load requested while running, stopping first");
            self.stop();
        }

        log::info!("Loading {}", source.describe());
        let buffer = match source.decode() {
            Ok(buffer) => buffer,
            Err(e) => {
                log::error!("Failed to decode {}: {}", source.describe(), e);
                self.notify(Notification::error(
                    NotificationCategory::Decode,
                    format!("Failed to decode {}: {}", source.describe(), e),
                ));
                self.unload();
                return Err(e.into());
            }
        };

        let sample_count = buffer.len();
        let sample_rate = buffer.sample_rate();
        let old = lock_pages(&self.pages).replace(buffer);
        drop(old);

        if let Err(e) = self.haptics.prime(&self.config.pattern()) {
            if self.config.require_haptics {
                log::error!("Haptic engine initialization failed: {}", e);
                self.notify(Notification::error(
                    NotificationCategory::Actuator,
                    e.to_string(),
                ));
                self.unload();
                return Err(PipelineError::ActuatorInit(e));
            }

            log::warn!("Continuing without haptics: {}", e);
            self.notify(Notification::warning(
                NotificationCategory::Actuator,
                format!("Continuing without haptics: {}", e),
            ));
        }

        self.state = PipelineState::Loaded;
        log::info!(
            "Loaded {} samples @ {} Hz ({} pages of {})",
            sample_count,
            sample_rate,
            lock_pages(&self.pages).page_count(),
            self.config.page_size
        );
        Ok(())
    }

    /// Start the haptic player and register the render callback
    pub fn start(&mut self) -> Result<(), PipelineError> {
        match self.state {
            PipelineState::Running => return Ok(()),
            PipelineState::Loaded => {}
            from => {
                return Err(PipelineError::InvalidTransition {
                    from,
                    action: "start",
                });
            }
        }

        // Dispatcher first, so the first rendered page is not treated as stale
        self.haptics.start();

        let mut renderer = PageRenderer::new(
            Arc::clone(&self.pages),
            self.haptics.slot(),
            self.config.strategy,
            self.config.page_size,
        );
        if let Err(e) = self
            .output
            .register(Box::new(move |out: &mut [f32]| renderer.render(out)))
        {
            log::error!("Failed to register the render callback: {}", e);
            self.notify(Notification::error(
                NotificationCategory::Output,
                e.to_string(),
            ));
            self.haptics.stop();
            return Err(e.into());
        }

        self.check_sample_rate();
        self.state = PipelineState::Running;
        log::info!("Pipeline running");
        Ok(())
    }

    /// Release the output, halt the player and clear the buffer. Idempotent.
    pub fn stop(&mut self) {
        self.output.release();
        self.haptics.stop();
        self.clear_pages();

        match self.state {
            PipelineState::Uninitialized | PipelineState::Stopped => {}
            _ => {
                self.state = PipelineState::Stopped;
                log::info!("Pipeline stopped");
            }
        }
    }

    /// Rewind to page 0 and clear the buffer
    pub fn reset(&mut self) {
        self.clear_pages();
        log::debug!("Page buffer reset");
    }

    /// The platform haptic engine was reset; restart the player if running
    pub fn handle_actuator_reset(&mut self) {
        self.haptics.handle_reset();
    }

    /// The platform haptic engine stopped on its own
    ///
    /// Only reported; a reset usually follows and restarts the player.
    pub fn handle_actuator_stopped(&self, reason: ActuatorStopReason) {
        self.haptics.handle_stopped(reason);
    }

    fn unload(&mut self) {
        self.haptics.release();
        self.clear_pages();
        if self.state != PipelineState::Uninitialized {
            self.state = PipelineState::Stopped;
        }
    }

    fn clear_pages(&self) {
        let old = lock_pages(&self.pages).reset();
        drop(old);
    }

    fn check_sample_rate(&self) {
        let Some(output_rate) = self.output.sample_rate() else {
            return;
        };
        if let Some(loaded_rate) = self.sample_rate()
            && loaded_rate != output_rate
        {
            log::warn!(
                "Output runs at {} Hz but the material is {} Hz, playback speed will differ",
                output_rate,
                loaded_rate
            );
            self.notify(Notification::warning(
                NotificationCategory::Output,
                format!(
                    "Sample rate mismatch: output {} Hz, material {} Hz",
                    output_rate, loaded_rate
                ),
            ));
        }
    }

    fn notify(&self, notification: Notification) {
        try_notify(self.notification_tx.as_ref(), notification);
    }
}

impl<A: Actuator + 'static, O: AudioOutput> SignalProvider for HapticPipeline<A, O> {
    fn get_signal(&self) -> Vec<f32> {
        let page = lock_pages(&self.pages).next_page().to_vec();
        if !page.is_empty() {
            self.haptics
                .slot()
                .publish(self.config.strategy.derive(&page));
        }
        page
    }
}

impl<A: Actuator + 'static, O: AudioOutput> Drop for HapticPipeline<A, O> {
    fn drop(&mut self) {
        self.stop();
    }
}
