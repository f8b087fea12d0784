//! Cancel-and-reschedule timer driven by caller-supplied instants.
//!
//! Nothing here sleeps or spawns: the host passes `Instant`s into
//! [`Debouncer::schedule`] and [`Debouncer::fire_if_due`].

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    due: Option<Instant>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self { delay, due: None }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// True when the delay is zero and work should run synchronously.
    pub fn is_immediate(&self) -> bool {
        self.delay.is_zero()
    }

    /// (Re)start the countdown from `now`, dropping any earlier deadline.
    pub fn schedule(&mut self, now: Instant) {
        self.due = Some(now + self.delay);
    }

    pub fn cancel(&mut self) {
        self.due = None;
    }

    pub fn is_pending(&self) -> bool {
        self.due.is_some()
    }

    pub fn due(&self) -> Option<Instant> {
        self.due
    }

    /// Consume the pending deadline if it has passed.
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        match self.due {
            Some(due) if due <= now => {
                self.due = None;
                true
            }
            _ => false,
        }
    }
}
