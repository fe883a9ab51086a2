use std::time::{Duration, Instant};

/// A recurring timer driven by the event loop.
///
/// Starting an already running timer pushes its next expiry out by a full
/// period; stopping it drops any pending expiry.
#[derive(Debug, Clone)]
pub struct PollTimer {
    period: Duration,
    due: Option<Instant>,
}

impl PollTimer {
    pub fn new(period: Duration) -> Self {
        Self { period, due: None }
    }

    pub fn start(&mut self, now: Instant) {
        self.due = Some(now + self.period);
    }

    pub fn stop(&mut self) {
        self.due = None;
    }

    pub fn is_active(&self) -> bool {
        self.due.is_some()
    }

    /// Returns true once per expiry and arms the next one
    pub fn take_due(&mut self, now: Instant) -> bool {
        match self.due {
            Some(due) if now >= due => {
                self.due = Some(now + self.period);
                true
            }
            _ => false,
        }
    }
}
