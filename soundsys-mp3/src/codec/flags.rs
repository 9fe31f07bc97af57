//! Session state flags shared between threads
//!
//! A playback thread polls `end_of_stream()` while a control thread may call
//! `cleanup()` or re-initialize. Both flags live behind one mutex.

use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default, Clone, Copy)]
struct FlagState {
    initialized: bool,
    end_of_stream: bool,
}

/// `initialized` / `end_of_stream` pair for one codec session
#[derive(Debug, Default)]
pub struct SessionFlags {
    state: Mutex<FlagState>,
}

impl SessionFlags {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, FlagState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn initialized(&self) -> bool {
        self.lock().initialized
    }

    pub fn set_initialized(&self, value: bool) {
        self.lock().initialized = value;
    }

    pub fn end_of_stream(&self) -> bool {
        self.lock().end_of_stream
    }

    /// Latch end-of-stream. Only a new session clears it.
    pub fn mark_end_of_stream(&self) {
        self.lock().end_of_stream = true;
    }

    /// Start a fresh session: initialized, not at end-of-stream
    pub(crate) fn begin_session(&self) {
        let mut state = self.lock();
        state.end_of_stream = false;
        state.initialized = true;
    }
}
