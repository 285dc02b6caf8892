//! Timed loop driving a [`SessionEngine`] on the tokio runtime.
//!
//! The running flag arrives on a `watch` channel and events leave on an
//! unbounded `mpsc` channel. Dropping the control sender is treated as the
//! front end going away: side effects are halted and the run is cancelled.

use std::time::Duration;

use chrono::Utc;
use tokio::sync::{mpsc, watch};

use super::engine::{SessionEngine, SessionStatus};
use crate::cues::CueDispatcher;
use crate::events::Event;
use crate::storage::SessionRecord;

#[derive(Debug, Clone, PartialEq)]
pub enum SessionOutcome {
    /// Target reached. The record is ready to be written to history.
    Completed(SessionRecord),
    Cancelled { elapsed_secs: u64 },
}

#[derive(Debug)]
pub struct SessionRunner {
    engine: SessionEngine,
    cues: CueDispatcher,
    events: mpsc::UnboundedSender<Event>,
}

impl SessionRunner {
    pub fn new(engine: SessionEngine, cues: CueDispatcher, events: mpsc::UnboundedSender<Event>) -> Self {
        Self { engine, cues, events }
    }

    pub fn engine(&self) -> &SessionEngine {
        &self.engine
    }

    /// Run until the session completes or `control`'s sender is dropped.
    ///
    /// Phases advance strictly one after another. A change of the running
    /// flag interrupts the current wait; on resume the interrupted phase
    /// is entered again from its start.
    pub async fn run(mut self, mut control: watch::Receiver<bool>) -> SessionOutcome {
        loop {
            if self.engine.status() == SessionStatus::Completed {
                self.cues.halt();
                let record = SessionRecord::new(
                    self.engine.technique(),
                    self.engine.duration_minutes(),
                    Utc::now(),
                );
                return SessionOutcome::Completed(record);
            }

            let running = *control.borrow_and_update();
            if !running {
                self.pause();
                if control.changed().await.is_err() {
                    return self.cancel();
                }
                continue;
            }

            if let Some(event) = self.engine.start() {
                self.emit(event);
            }

            let step = self.engine.current_step();
            if let Some(event) = self.engine.phase_entered() {
                self.emit(event);
            }
            self.cues.on_phase(&step);

            let wait = Duration::from_secs(u64::from(step.duration_secs));
            tokio::select! {
                () = tokio::time::sleep(wait) => {
                    if let Some(event) = self.engine.phase_elapsed() {
                        self.emit(event);
                    }
                }
                changed = control.changed() => {
                    if changed.is_err() {
                        return self.cancel();
                    }
                    // A pause and resume that landed within one wait still
                    // count as a pause.
                    if *control.borrow() {
                        self.pause();
                    }
                }
            }
        }
    }

    fn pause(&mut self) {
        if let Some(event) = self.engine.pause() {
            self.cues.halt();
            self.emit(event);
        }
    }

    fn cancel(mut self) -> SessionOutcome {
        self.cues.halt();
        let elapsed_secs = self.engine.elapsed_secs();
        tracing::info!(elapsed = elapsed_secs, "session cancelled");
        self.emit(Event::SessionCancelled {
            elapsed_secs,
            at: Utc::now(),
        });
        SessionOutcome::Cancelled { elapsed_secs }
    }

    fn emit(&self, event: Event) {
        tracing::debug!(kind = event.kind(), "session event");
        // No listener left is fine; the loop keeps its own state.
        let _ = self.events.send(event);
    }
}
