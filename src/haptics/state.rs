// Engine state - Lifecycle flag of the haptic engine, shared across threads

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Uninitialized = 0,
    Running = 1,
    Stopped = 2,
}

impl From<u8> for EngineState {
    fn from(value: u8) -> Self {
        match value {
            1 => EngineState::Running,
            2 => EngineState::Stopped,
            _ => EngineState::Uninitialized,
        }
    }
}

/// Atomic wrapper so the dispatcher thread can observe the engine state
///
/// Only the owning channel writes it.
#[derive(Clone)]
pub struct AtomicEngineState {
    inner: Arc<AtomicU8>,
}

impl AtomicEngineState {
    pub fn new(state: EngineState) -> Self {
        Self {
            inner: Arc::new(AtomicU8::new(state as u8)),
        }
    }

    pub fn get(&self) -> EngineState {
        EngineState::from(self.inner.load(Ordering::Acquire))
    }

    pub fn set(&self, state: EngineState) {
        self.inner.store(state as u8, Ordering::Release);
    }

    pub fn is_running(&self) -> bool {
        self.get() == EngineState::Running
    }
}

impl Default for AtomicEngineState {
    fn default() -> Self {
        Self::new(EngineState::Uninitialized)
    }
}
