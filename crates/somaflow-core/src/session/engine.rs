//! Breathing session engine.
//!
//! The engine is a clock-free state machine over [`SessionState`]. It never
//! sleeps: the caller waits out each phase and then reports it with
//! `phase_elapsed()`. This keeps every transition deterministic and lets the
//! timed loop in [`super::runner`] stay a thin shell around it.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running <-> Paused
//!            |
//!            v
//!        Completed
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = SessionEngine::new(TechniqueName::Resonant, 1)?;
//! engine.start();
//! loop {
//!     engine.phase_entered();            // Some(PhaseEntered)
//!     // ... wait the phase duration ...
//!     if let Some(done) = engine.phase_elapsed() { break; }
//! }
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::cycle::{BreathCycle, Phase, PhaseStep};
use crate::error::ValidationError;
use crate::events::Event;
use crate::technique::{Technique, TechniqueName};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Idle,
    Running,
    Paused,
    Completed,
}

/// Transient, in-memory state of one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub status: SessionStatus,
    pub phase_index: usize,
    pub elapsed_secs: u64,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            status: SessionStatus::Idle,
            phase_index: 0,
            elapsed_secs: 0,
        }
    }
}

/// Built only through [`SessionEngine::new`] or [`SessionEngine::with_cycle`];
/// it serializes for inspection but is never read back.
#[derive(Debug, Clone, Serialize)]
pub struct SessionEngine {
    technique: TechniqueName,
    duration_minutes: u32,
    cycle: BreathCycle,
    /// First step of `cycle`, held so the current step is always defined.
    #[serde(skip)]
    first_step: PhaseStep,
    state: SessionState,
}

impl SessionEngine {
    /// Create an engine for `technique` running `duration_minutes`.
    ///
    /// # Errors
    /// Returns an error for a zero duration or a pattern with no
    /// non-zero phase.
    pub fn new(technique: TechniqueName, duration_minutes: u32) -> Result<Self, ValidationError> {
        let cycle = BreathCycle::from_pattern(&Technique::lookup(technique).pattern);
        Self::with_cycle(technique, duration_minutes, cycle)
    }

    pub fn with_cycle(
        technique: TechniqueName,
        duration_minutes: u32,
        cycle: BreathCycle,
    ) -> Result<Self, ValidationError> {
        if duration_minutes == 0 {
            return Err(ValidationError::InvalidDuration(duration_minutes.to_string()));
        }
        let first_step = cycle.get(0).ok_or(ValidationError::EmptyCycle)?;
        Ok(Self {
            technique,
            duration_minutes,
            cycle,
            first_step,
            state: SessionState::default(),
        })
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn technique(&self) -> TechniqueName {
        self.technique
    }

    pub fn duration_minutes(&self) -> u32 {
        self.duration_minutes
    }

    pub fn cycle(&self) -> &BreathCycle {
        &self.cycle
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn status(&self) -> SessionStatus {
        self.state.status
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.state.elapsed_secs
    }

    pub fn target_secs(&self) -> u64 {
        u64::from(self.duration_minutes).saturating_mul(60)
    }

    pub fn current_step(&self) -> PhaseStep {
        self.cycle.get(self.state.phase_index).unwrap_or(self.first_step)
    }

    pub fn current_phase(&self) -> Phase {
        self.current_step().phase
    }

    /// 0.0 .. 1.0 fraction of the target duration.
    pub fn progress(&self) -> f64 {
        let target = self.target_secs();
        if target == 0 {
            return 0.0;
        }
        (self.state.elapsed_secs as f64 / target as f64).min(1.0)
    }

    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            status: self.state.status,
            technique: self.technique,
            phase: self.current_phase(),
            elapsed_secs: self.state.elapsed_secs,
            target_secs: self.target_secs(),
            progress: self.progress(),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self) -> Option<Event> {
        match self.state.status {
            SessionStatus::Idle => {
                self.state.status = SessionStatus::Running;
                tracing::info!(technique = %self.technique, minutes = self.duration_minutes, "session started");
                Some(Event::SessionStarted {
                    technique: self.technique,
                    target_secs: self.target_secs(),
                    at: Utc::now(),
                })
            }
            SessionStatus::Paused => {
                self.state.status = SessionStatus::Running;
                tracing::debug!(elapsed = self.state.elapsed_secs, "session resumed");
                Some(Event::SessionResumed {
                    phase: self.current_phase(),
                    elapsed_secs: self.state.elapsed_secs,
                    at: Utc::now(),
                })
            }
            SessionStatus::Running | SessionStatus::Completed => None,
        }
    }

    /// Freeze elapsed time. The phase position is kept; the interrupted
    /// phase is not credited and will be re-entered in full on resume.
    pub fn pause(&mut self) -> Option<Event> {
        match self.state.status {
            SessionStatus::Running => {
                self.state.status = SessionStatus::Paused;
                tracing::debug!(elapsed = self.state.elapsed_secs, "session paused");
                Some(Event::SessionPaused {
                    phase: self.current_phase(),
                    elapsed_secs: self.state.elapsed_secs,
                    at: Utc::now(),
                })
            }
            _ => None,
        }
    }

    pub fn toggle(&mut self) -> Option<Event> {
        if self.state.status == SessionStatus::Running {
            self.pause()
        } else {
            self.start()
        }
    }

    /// Announce the phase about to be waited out. Only while running.
    pub fn phase_entered(&self) -> Option<Event> {
        if self.state.status != SessionStatus::Running {
            return None;
        }
        let step = self.current_step();
        Some(Event::PhaseEntered {
            phase: step.phase,
            label: step.phase.label().to_string(),
            duration_secs: step.duration_secs,
            elapsed_secs: self.state.elapsed_secs,
            at: Utc::now(),
        })
    }

    /// Credit the current phase and move to the next one.
    ///
    /// Returns `Some(Event::SessionCompleted)` exactly once, on the call
    /// that brings elapsed time to or past the target.
    pub fn phase_elapsed(&mut self) -> Option<Event> {
        if self.state.status != SessionStatus::Running {
            return None;
        }
        let step = self.current_step();
        self.state.elapsed_secs = self
            .state
            .elapsed_secs
            .saturating_add(u64::from(step.duration_secs));
        self.advance();

        if self.state.elapsed_secs >= self.target_secs() {
            self.state.status = SessionStatus::Completed;
            tracing::info!(
                technique = %self.technique,
                elapsed = self.state.elapsed_secs,
                "session completed"
            );
            return Some(Event::SessionCompleted {
                technique: self.technique,
                duration_minutes: self.duration_minutes,
                elapsed_secs: self.state.elapsed_secs,
                at: Utc::now(),
            });
        }
        None
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn advance(&mut self) {
        let next = self.state.phase_index + 1;
        self.state.phase_index = if next < self.cycle.len() { next } else { 0 };
    }
}
