use std::time::{Duration, Instant};

/// Wall-clock progress bar for a session.
///
/// Runs independently of phase timing: it only knows the target duration,
/// how much was banked before the last resume, and when that resume
/// happened.
#[derive(Debug, Clone)]
pub struct ProgressClock {
    target: Duration,
    banked: Duration,
    resumed_at: Option<Instant>,
}

impl ProgressClock {
    pub fn new(target: Duration) -> Self {
        Self {
            target,
            banked: Duration::ZERO,
            resumed_at: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.resumed_at.is_some()
    }

    /// Start (or restart) from `elapsed` at `now`.
    pub fn resume(&mut self, elapsed: Duration, now: Instant) {
        self.banked = elapsed;
        self.resumed_at = Some(now);
    }

    /// Freeze at `elapsed`.
    pub fn pause(&mut self, elapsed: Duration) {
        self.banked = elapsed;
        self.resumed_at = None;
    }

    pub fn elapsed(&self, now: Instant) -> Duration {
        let running = self
            .resumed_at
            .map(|t| now.saturating_duration_since(t))
            .unwrap_or_default();
        (self.banked + running).min(self.target)
    }

    /// 0.0 .. 1.0
    pub fn fraction(&self, now: Instant) -> f64 {
        if self.target.is_zero() {
            return 0.0;
        }
        self.elapsed(now).as_secs_f64() / self.target.as_secs_f64()
    }

    pub fn remaining(&self, now: Instant) -> Duration {
        self.target.saturating_sub(self.elapsed(now))
    }
}
