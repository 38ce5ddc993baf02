use std::time::{Duration, Instant};

use tracing::trace;

/// Quiet-period timer for the filter input.
///
/// Every keystroke submits the full current text, replacing any pending
/// value and restarting the window. The value is handed out by `poll()`
/// once the window has elapsed with no further submission, so a burst of
/// keystrokes collapses into a single commit carrying the final text.
#[derive(Debug)]
pub struct Debouncer {
    window: Duration,
    pending: Option<(String, Instant)>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
        }
    }

    /// Replace the pending value and restart the quiet period.
    pub fn submit(&mut self, value: String) {
        trace!("Debounce submit: {value:?}");
        self.pending = Some((value, Instant::now()));
    }

    /// Drop the pending value without committing it.
    pub fn cancel(&mut self) -> Option<String> {
        self.pending.take().map(|(value, _)| value)
    }

    /// Hand out the pending value once the quiet period has elapsed.
    pub fn poll(&mut self) -> Option<String> {
        self.poll_at(Instant::now())
    }

    fn poll_at(&mut self, now: Instant) -> Option<String> {
        match &self.pending {
            Some((_, submitted)) if now.duration_since(*submitted) >= self.window => {
                self.pending.take().map(|(value, _)| value)
            }
            _ => None,
        }
    }
}
