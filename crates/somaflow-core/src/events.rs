use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::{Phase, SessionStatus};
use crate::technique::TechniqueName;

/// Every state change of a breathing session produces an Event.
/// Front ends render them; the runner publishes them on a channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    SessionStarted {
        technique: TechniqueName,
        target_secs: u64,
        at: DateTime<Utc>,
    },
    SessionPaused {
        phase: Phase,
        elapsed_secs: u64,
        at: DateTime<Utc>,
    },
    SessionResumed {
        phase: Phase,
        elapsed_secs: u64,
        at: DateTime<Utc>,
    },
    PhaseEntered {
        phase: Phase,
        label: String,
        duration_secs: u32,
        elapsed_secs: u64,
        at: DateTime<Utc>,
    },
    SessionCompleted {
        technique: TechniqueName,
        duration_minutes: u32,
        elapsed_secs: u64,
        at: DateTime<Utc>,
    },
    /// The controlling front end went away before completion.
    SessionCancelled {
        elapsed_secs: u64,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        status: SessionStatus,
        technique: TechniqueName,
        phase: Phase,
        elapsed_secs: u64,
        target_secs: u64,
        progress: f64,
        at: DateTime<Utc>,
    },
}

impl Event {
    pub fn kind(&self) -> &'static str {
        match self {
            Event::SessionStarted { .. } => "session_started",
            Event::SessionPaused { .. } => "session_paused",
            Event::SessionResumed { .. } => "session_resumed",
            Event::PhaseEntered { .. } => "phase_entered",
            Event::SessionCompleted { .. } => "session_completed",
            Event::SessionCancelled { .. } => "session_cancelled",
            Event::StateSnapshot { .. } => "state_snapshot",
        }
    }
}
