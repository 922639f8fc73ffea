//! Minimum spacing between real refresh calls.

use std::time::{Duration, Instant};

/// Tracks when the last successful call happened.
///
/// Only successes open a new window, so a failed call may be retried
/// straight away.
#[derive(Debug, Clone)]
pub struct Throttle {
    min_interval: Duration,
    last_success: Option<Instant>,
}

impl Throttle {
    #[must_use]
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_success: None,
        }
    }

    /// Whether a real call is allowed at `now`.
    #[must_use]
    pub fn is_ready(&self, now: Instant) -> bool {
        self.last_success
            .is_none_or(|last| now.saturating_duration_since(last) >= self.min_interval)
    }

    /// Record a successful call at `now`.
    pub fn mark(&mut self, now: Instant) {
        self.last_success = Some(now);
    }
}
