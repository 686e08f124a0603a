//! Cancellable quiet-window timers.
//!
//! The editor is strictly single-threaded: a [`Debounce`] is just a deadline
//! value. `schedule` (re)arms it at `now + window`, superseding any earlier
//! deadline, and the session's `tick` pump calls `fire_due` with the current
//! instant. Nothing here spawns threads or sleeps.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct Debounce {
    window: Duration,
    deadline: Option<Instant>,
}

impl Debounce {
    pub fn new(window: Duration) -> Self {
        Debounce {
            window,
            deadline: None,
        }
    }

    /// Arms (or re-arms) the timer at `now + window`. A later schedule
    /// always replaces an earlier deadline.
    pub fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.window);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Fires at most once per schedule: returns `true` and disarms when the
    /// deadline has passed.
    pub fn fire_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}
