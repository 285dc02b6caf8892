//! # SomaFlow Core Library
//!
//! Business logic for the SomaFlow breathing coach. Every front end (the
//! `somaflow` CLI included) is a thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Session engine**: a clock-free state machine cycling through the
//!   phases of a breathing technique until the target duration is reached
//! - **Session runner**: the tokio loop that waits out each phase and fires
//!   audio, haptic and animation cues
//! - **Storage**: a string-keyed store (SQLite or in-memory) holding user
//!   settings, session history and the all-time counter, plus a TOML
//!   device configuration
//! - **Stats**: weekly counts and the summary/progress views
//!
//! ## Key Components
//!
//! - [`SessionEngine`]: phase cycler and completion detection
//! - [`SessionRunner`]: timed loop with pause/resume
//! - [`HistoryStore`]: bounded history and session counter
//! - [`Settings`]: persisted user preferences

pub mod cues;
pub mod error;
pub mod events;
pub mod session;
pub mod stats;
pub mod storage;
pub mod technique;

pub use cues::{AudioBackend, Cue, CueDispatcher, CueKind, CueLibrary, CuePlayer, HapticStyle, Haptics, PhaseAnimation, SoundId};
pub use error::{ConfigError, CoreError, CueError, Result, StorageError, ValidationError};
pub use events::Event;
pub use session::{BreathCycle, Phase, PhaseStep, ProgressClock, SessionEngine, SessionOutcome, SessionRunner, SessionStatus};
pub use stats::{count_sessions_this_week, completed_days, week_bounds, ProgressReport, Summary};
pub use storage::{Config, HistoryStore, KeyValueStore, MemoryStore, SessionRecord, SettingKey, Settings, SqliteStore};
pub use technique::{Pattern, Technique, TechniqueName};
