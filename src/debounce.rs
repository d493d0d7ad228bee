//! Trailing debounce over explicit timestamps.
//!
//! Bursts of triggers collapse into one firing that happens once the
//! window has passed since the *last* trigger, carrying the state supplied
//! by that last trigger. Time is passed in by the caller, which keeps the
//! debouncer independent of any runtime.

use std::time::{Duration, Instant};

/// Default debounce window.
pub const DEFAULT_WINDOW: Duration = Duration::from_millis(300);

/// Trailing-edge debouncer holding the most recent pending state.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    window: Duration,
    pending: Option<(Instant, T)>,
    fired: usize,
}

impl<T> Debouncer<T> {
    /// Debouncer with the given quiet window.
    #[must_use]
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
            fired: 0,
        }
    }

    /// Record a trigger; replaces any pending state and restarts the window.
    pub fn trigger(&mut self, now: Instant, state: T) {
        self.pending = Some((now, state));
    }

    /// Fire if the window has elapsed since the last trigger.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        let ready = self
            .pending
            .as_ref()
            .is_some_and(|(at, _)| now.saturating_duration_since(*at) >= self.window);
        if !ready {
            return None;
        }
        self.fired += 1;
        self.pending.take().map(|(_, state)| state)
    }

    /// When the pending trigger will fire, if one is pending.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(at, _)| *at + self.window)
    }

    /// Whether a trigger is waiting.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Number of times the debouncer has fired.
    #[must_use]
    pub fn fired(&self) -> usize {
        self.fired
    }

    /// Quiet window length.
    #[must_use]
    pub fn window(&self) -> Duration {
        self.window
    }
}

impl<T> Default for Debouncer<T> {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}
