// Haptic channel - Actuator lifecycle plus the parameter dispatcher thread
//
// Producers (render callback, capture callback, get_signal) publish into the
// ParameterSlot. A dispatcher thread polls the slot and forwards newer values
// to the actuator. Send failures are logged and reported, and the loop keeps
// going.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use super::slot::ParameterSlot;
use super::state::{AtomicEngineState, EngineState};
use super::{Actuator, ActuatorResult, ActuatorStopReason, ContinuousPattern, TIME_IMMEDIATE};
use crate::messaging::{
    Notification, NotificationCategory, SharedNotificationProducer, try_notify,
};

/// Shortest dispatcher poll period; a zero interval would spin
pub const MIN_DISPATCH_INTERVAL: Duration = Duration::from_millis(1);

fn lock_actuator<A>(actuator: &Mutex<A>) -> MutexGuard<'_, A> {
    actuator.lock().unwrap_or_else(|e| e.into_inner())
}

struct Dispatcher {
    running: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl Dispatcher {
    fn spawn<A: Actuator + 'static>(
        actuator: Arc<Mutex<A>>,
        slot: Arc<ParameterSlot>,
        state: AtomicEngineState,
        interval: Duration,
        notification_tx: Option<SharedNotificationProducer>,
    ) -> std::io::Result<Self> {
        let running = Arc::new(AtomicBool::new(true));
        let running_clone = Arc::clone(&running);

        // Values published before start are stale
        let mut seen = slot.sequence();

        let handle = thread::Builder::new()
            .name("haptic-dispatch".to_string())
            .spawn(move || {
                while running_clone.load(Ordering::Acquire) {
                    if let Some(parameters) = slot.take_newer(&mut seen)
                        && state.is_running()
                    {
                        let result =
                            lock_actuator(&actuator).send_parameters(parameters, TIME_IMMEDIATE);
                        if let Err(e) = result {
                            log::warn!("Dropping haptic update {:?}: {}", parameters, e);
                            try_notify(
                                notification_tx.as_ref(),
                                Notification::warning(NotificationCategory::Actuator, e.to_string()),
                            );
                        }
                    }
                    thread::sleep(interval);
                }
            })?;

        Ok(Self { running, handle })
    }

    fn shutdown(self) {
        self.running.store(false, Ordering::Release);
        if self.handle.join().is_err() {
            log::error!("Haptic dispatcher thread panicked");
        }
    }
}

/// Owns the actuator, its engine state and the dispatcher thread
pub struct HapticChannel<A: Actuator + 'static> {
    actuator: Arc<Mutex<A>>,
    slot: Arc<ParameterSlot>,
    state: AtomicEngineState,
    supported: bool,
    dispatch_interval: Duration,
    dispatcher: Option<Dispatcher>,
    notification_tx: Option<SharedNotificationProducer>,
}

impl<A: Actuator + 'static> HapticChannel<A> {
    pub fn new(actuator: A, dispatch_interval: Duration) -> Self {
        Self {
            actuator: Arc::new(Mutex::new(actuator)),
            slot: Arc::new(ParameterSlot::new()),
            state: AtomicEngineState::default(),
            supported: false,
            dispatch_interval: dispatch_interval.max(MIN_DISPATCH_INTERVAL),
            dispatcher: None,
            notification_tx: None,
        }
    }

    pub fn with_notifications(mut self, tx: SharedNotificationProducer) -> Self {
        self.set_notifications(tx);
        self
    }

    pub fn set_notifications(&mut self, tx: SharedNotificationProducer) {
        self.notification_tx = Some(tx);
    }

    /// Slot producers publish into
    pub fn slot(&self) -> Arc<ParameterSlot> {
        Arc::clone(&self.slot)
    }

    pub fn state(&self) -> EngineState {
        self.state.get()
    }

    pub fn dispatch_interval(&self) -> Duration {
        self.dispatch_interval
    }

    /// Whether updates will reach the actuator once started
    pub fn is_enabled(&self) -> bool {
        self.supported && self.state.get() != EngineState::Uninitialized
    }

    /// Create the engine and its continuous player
    ///
    /// On failure the engine stays Uninitialized. An unsupported device is
    /// not an error: the channel simply never sends anything.
    pub fn prime(&mut self, pattern: &ContinuousPattern) -> ActuatorResult<()> {
        self.stop();
        self.state.set(EngineState::Uninitialized);

        let mut actuator = lock_actuator(&self.actuator);
        self.supported = actuator.supports_haptic_feedback();
        if !self.supported {
            log::info!("Haptic feedback not supported, parameter updates disabled");
            return Ok(());
        }

        actuator.prepare(pattern)?;
        drop(actuator);

        self.state.set(EngineState::Stopped);
        log::debug!("Haptic engine primed with {:?}", pattern);
        Ok(())
    }

    /// Start the continuous player and the dispatcher
    ///
    /// Failures degrade to no haptic output; they are logged, not returned.
    pub fn start(&mut self) {
        if !self.is_enabled() || self.state.is_running() {
            return;
        }

        if let Err(e) = lock_actuator(&self.actuator).start(TIME_IMMEDIATE) {
            log::error!("Failed to start the haptic player: {}", e);
            try_notify(
                self.notification_tx.as_ref(),
                Notification::error(NotificationCategory::Actuator, e.to_string()),
            );
            return;
        }

        self.state.set(EngineState::Running);
        match Dispatcher::spawn(
            Arc::clone(&self.actuator),
            Arc::clone(&self.slot),
            self.state.clone(),
            self.dispatch_interval,
            self.notification_tx.clone(),
        ) {
            Ok(dispatcher) => {
                self.dispatcher = Some(dispatcher);
                log::info!("Haptic player started");
            }
            Err(e) => {
                log::error!("Failed to spawn the haptic dispatcher: {}", e);
                self.state.set(EngineState::Stopped);
                if let Err(e) = lock_actuator(&self.actuator).stop() {
                    log::warn!("Failed to stop the haptic player: {}", e);
                }
            }
        }
    }

    /// Stop the dispatcher and the player. Idempotent.
    pub fn stop(&mut self) {
        if let Some(dispatcher) = self.dispatcher.take() {
            dispatcher.shutdown();
        }

        if self.state.is_running() {
            if let Err(e) = lock_actuator(&self.actuator).stop() {
                log::warn!("Failed to stop the haptic player: {}", e);
            }
            self.state.set(EngineState::Stopped);
            log::info!("Haptic player stopped");
        }
    }

    /// Stop and forget the primed engine; prime() is needed again before start()
    pub fn release(&mut self) {
        self.stop();
        self.state.set(EngineState::Uninitialized);
    }

    /// The platform engine stopped by itself
    ///
    /// Only reported: the engine state is left alone so that the reset which
    /// usually follows can restart a running player.
    pub fn handle_stopped(&self, reason: ActuatorStopReason) {
        log::warn!("Haptic engine stopped: {}", reason);
        try_notify(
            self.notification_tx.as_ref(),
            Notification::warning(
                NotificationCategory::Actuator,
                format!("Haptic engine stopped: {}", reason),
            ),
        );
    }

    /// Restart the player after the platform engine reset itself
    pub fn handle_reset(&mut self) {
        if !self.state.is_running() {
            return;
        }
        match lock_actuator(&self.actuator).start(TIME_IMMEDIATE) {
            Ok(()) => log::info!("Haptic engine restarted after reset"),
            Err(e) => {
                log::error!("Failed to restart the haptic engine: {}", e);
                try_notify(
                    self.notification_tx.as_ref(),
                    Notification::error(NotificationCategory::Actuator, e.to_string()),
                );
            }
        }
    }
}

impl<A: Actuator + 'static> Drop for HapticChannel<A> {
    fn drop(&mut self) {
        self.stop();
    }
}
