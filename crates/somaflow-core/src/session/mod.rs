mod cycle;
mod engine;
mod progress;
mod runner;

pub use cycle::{AnimationRange, BreathCycle, Phase, PhaseStep};
pub use engine::{SessionEngine, SessionState, SessionStatus};
pub use progress::ProgressClock;
pub use runner::{SessionOutcome, SessionRunner};
