//! Integration tests for the timed session loop.
//!
//! Tokio's clock is paused, so every phase wait completes instantly while
//! still being ordered by its deadline.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use somaflow_core::session::AnimationRange;
use somaflow_core::{
    AudioBackend, BreathCycle, Cue, CueDispatcher, CueError, CueLibrary, CuePlayer, Event, Haptics,
    HistoryStore, MemoryStore, Pattern, Phase, PhaseAnimation, SessionEngine, SessionOutcome,
    SessionRunner, SoundId, TechniqueName,
};
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;

#[derive(Default)]
struct Recorder {
    loads: Vec<String>,
    plays: usize,
    unloads: usize,
    stops: usize,
    pulses: usize,
    haptic_cancels: usize,
    animations: Vec<AnimationRange>,
    animation_resets: usize,
}

type Shared = Arc<Mutex<Recorder>>;

struct FakeAudio(Shared, u64);

impl AudioBackend for FakeAudio {
    fn load(&mut self, cue: Cue) -> Result<SoundId, CueError> {
        self.0.lock().unwrap().loads.push(cue.file_name());
        self.1 += 1;
        Ok(SoundId(self.1))
    }
    fn play(&mut self, _sound: SoundId) -> Result<(), CueError> {
        self.0.lock().unwrap().plays += 1;
        Ok(())
    }
    fn stop(&mut self, _sound: SoundId) -> Result<(), CueError> {
        self.0.lock().unwrap().stops += 1;
        Ok(())
    }
    fn unload(&mut self, _sound: SoundId) -> Result<(), CueError> {
        self.0.lock().unwrap().unloads += 1;
        Ok(())
    }
}

struct FakeHaptics(Shared);

impl Haptics for FakeHaptics {
    fn pulse(&mut self) -> Result<(), CueError> {
        self.0.lock().unwrap().pulses += 1;
        Ok(())
    }
    fn cancel(&mut self) -> Result<(), CueError> {
        self.0.lock().unwrap().haptic_cancels += 1;
        Ok(())
    }
}

struct FakeAnimation(Shared);

impl PhaseAnimation for FakeAnimation {
    fn play(&mut self, range: AnimationRange) {
        self.0.lock().unwrap().animations.push(range);
    }
    fn reset(&mut self) {
        self.0.lock().unwrap().animation_resets += 1;
    }
}

struct Harness {
    recorder: Shared,
    control: watch::Sender<bool>,
    events: mpsc::UnboundedReceiver<Event>,
    handle: tokio::task::JoinHandle<SessionOutcome>,
}

fn spawn(technique: TechniqueName, minutes: u32, sound: bool, vibration: bool) -> Harness {
    spawn_engine(SessionEngine::new(technique, minutes).unwrap(), sound, vibration)
}

fn spawn_engine(engine: SessionEngine, sound: bool, vibration: bool) -> Harness {
    let recorder: Shared = Arc::default();
    let cues = CueDispatcher::new(
        CuePlayer::new(Box::new(FakeAudio(Arc::clone(&recorder), 0)), CueLibrary::bundled()),
        Box::new(FakeHaptics(Arc::clone(&recorder))),
        Box::new(FakeAnimation(Arc::clone(&recorder))),
        sound,
        vibration,
    );
    let (event_tx, events) = mpsc::unbounded_channel();
    let (control, control_rx) = watch::channel(true);
    let runner = SessionRunner::new(engine, cues, event_tx);
    let handle = tokio::spawn(runner.run(control_rx));
    Harness { recorder, control, events, handle }
}

fn drain(events: &mut mpsc::UnboundedReceiver<Event>) -> Vec<Event> {
    let mut out = Vec::new();
    while let Ok(event) = events.try_recv() {
        out.push(event);
    }
    out
}

fn assert_elapsed(started: Instant, secs: u64) {
    let elapsed = started.elapsed();
    assert!(
        elapsed >= Duration::from_secs(secs) && elapsed < Duration::from_secs(secs) + Duration::from_millis(50),
        "expected ~{secs}s, got {elapsed:?}"
    );
}

fn entered_phases(events: &[Event]) -> Vec<Phase> {
    events
        .iter()
        .filter_map(|e| match e {
            Event::PhaseEntered { phase, .. } => Some(*phase),
            _ => None,
        })
        .collect()
}

#[tokio::test(start_paused = true)]
async fn resonant_one_minute_completes_once_after_sixty_seconds() {
    let started = Instant::now();
    let mut h = spawn(TechniqueName::Resonant, 1, true, true);

    let outcome = h.handle.await.unwrap();
    assert_elapsed(started, 60);

    let events = drain(&mut h.events);
    let phases = entered_phases(&events);
    assert_eq!(phases.len(), 12);
    assert!(phases.chunks(2).all(|p| p == [Phase::Inhale, Phase::Exhale]));

    let completions: Vec<_> = events
        .iter()
        .filter(|e| matches!(e, Event::SessionCompleted { .. }))
        .collect();
    assert_eq!(completions.len(), 1);
    assert!(matches!(
        completions[0],
        Event::SessionCompleted { elapsed_secs: 60, duration_minutes: 1, .. }
    ));

    match outcome {
        SessionOutcome::Completed(record) => {
            assert_eq!(record.technique, TechniqueName::Resonant);
            assert_eq!(record.duration, 1);
            assert!(record.timestamp().is_some());
        }
        other => panic!("expected completion, got {other:?}"),
    }

    let r = h.recorder.lock().unwrap();
    // Inhale 4s and exhale 6s cues both exist.
    assert_eq!(r.loads.len(), 12);
    assert_eq!(r.loads[0], "breathe-in-4.mp3");
    assert_eq!(r.loads[1], "breathe-out-6.mp3");
    // Each new cue unloads the previous one; completion releases the last.
    assert_eq!(r.unloads, 12);
    assert_eq!(r.pulses, 12);
    assert_eq!(r.animations[0], AnimationRange { from: 0, to: 100 });
    assert_eq!(r.animations[1], AnimationRange { from: 100, to: 0 });
}

#[tokio::test(start_paused = true)]
async fn pause_during_inhale_freezes_elapsed_time() {
    let started = Instant::now();
    let mut h = spawn(TechniqueName::Resonant, 1, true, true);

    tokio::time::sleep(Duration::from_secs(2)).await;
    h.control.send(false).unwrap();

    tokio::time::sleep(Duration::from_secs(30)).await;
    let while_paused = drain(&mut h.events);
    assert!(matches!(
        while_paused.last(),
        Some(Event::SessionPaused { phase: Phase::Inhale, elapsed_secs: 0, .. })
    ));
    {
        let r = h.recorder.lock().unwrap();
        assert_eq!(r.stops, 1, "pausing stops the playing cue");
        assert_eq!(r.haptic_cancels, 1);
        assert_eq!(r.animation_resets, 1);
    }

    h.control.send(true).unwrap();
    let outcome = h.handle.await.unwrap();
    assert!(matches!(outcome, SessionOutcome::Completed(_)));

    // 2s before the pause, 30s paused, then the full minute.
    assert_elapsed(started, 92);

    let after = drain(&mut h.events);
    assert!(matches!(
        after.first(),
        Some(Event::SessionResumed { phase: Phase::Inhale, elapsed_secs: 0, .. })
    ));
    let phases = entered_phases(&after);
    assert_eq!(phases.first(), Some(&Phase::Inhale));
    assert_eq!(phases.len(), 12);
    assert!(matches!(
        after.last(),
        Some(Event::SessionCompleted { elapsed_secs: 60, .. })
    ));
}

#[tokio::test(start_paused = true)]
async fn quick_pause_and_resume_still_restarts_the_phase() {
    let started = Instant::now();
    let mut h = spawn(TechniqueName::Resonant, 1, true, true);

    tokio::time::sleep(Duration::from_secs(2)).await;
    // Both flips land before the runner wakes up.
    h.control.send(false).unwrap();
    h.control.send(true).unwrap();

    let outcome = h.handle.await.unwrap();
    assert!(matches!(outcome, SessionOutcome::Completed(_)));
    assert_elapsed(started, 62);

    let events = drain(&mut h.events);
    let paused = events
        .iter()
        .position(|e| matches!(e, Event::SessionPaused { phase: Phase::Inhale, elapsed_secs: 0, .. }))
        .expect("pause event");
    assert!(matches!(
        events.get(paused + 1),
        Some(Event::SessionResumed { phase: Phase::Inhale, elapsed_secs: 0, .. })
    ));
    // The interrupted inhale is entered twice.
    assert_eq!(entered_phases(&events).len(), 13);

    let r = h.recorder.lock().unwrap();
    assert_eq!(r.haptic_cancels, 2, "pause and completion both halt");
    assert_eq!(r.animation_resets, 2);
}

#[tokio::test(start_paused = true)]
async fn sound_disabled_never_touches_audio() {
    let mut h = spawn(TechniqueName::BoxBreathing, 1, false, true);
    let outcome = h.handle.await.unwrap();
    assert!(matches!(outcome, SessionOutcome::Completed(_)));

    let phases = entered_phases(&drain(&mut h.events));
    // Fifteen 4s phases reach 60s; eight of them are inhales/exhales.
    assert_eq!(phases.len(), 15);
    assert_eq!(phases.iter().filter(|p| !p.is_hold()).count(), 8);

    let r = h.recorder.lock().unwrap();
    assert!(r.loads.is_empty());
    assert_eq!(r.plays, 0);
    assert_eq!(r.pulses, 8);
}

#[tokio::test(start_paused = true)]
async fn holds_have_no_cue() {
    let h = spawn(TechniqueName::FourSevenEight, 1, true, false);
    h.handle.await.unwrap();
    let r = h.recorder.lock().unwrap();
    // Ten phases: four inhales, three holds, three exhales.
    assert_eq!(r.loads.len(), 7);
    assert!(r
        .loads
        .iter()
        .all(|f| f == "breathe-in-4.mp3" || f == "breathe-out-8.mp3"));
    assert_eq!(r.pulses, 0);
}

#[tokio::test(start_paused = true)]
async fn durations_without_recorded_cues_play_nothing() {
    let cycle = BreathCycle::from_pattern(&Pattern { inhale: 5, hold: 0, exhale: 7, hold2: 0 });
    let engine = SessionEngine::with_cycle(TechniqueName::Resonant, 1, cycle).unwrap();
    let h = spawn_engine(engine, true, true);
    let outcome = h.handle.await.unwrap();
    assert!(matches!(outcome, SessionOutcome::Completed(_)));

    let r = h.recorder.lock().unwrap();
    assert!(r.loads.is_empty());
    assert!(r.pulses > 0);
}

#[tokio::test(start_paused = true)]
async fn dropping_control_cancels_and_halts_side_effects() {
    let mut h = spawn(TechniqueName::Resonant, 5, true, true);
    tokio::time::sleep(Duration::from_secs(11)).await;
    drop(h.control);

    let outcome = h.handle.await.unwrap();
    // Inhale (4) + exhale (6) credited; the second inhale was interrupted.
    assert_eq!(outcome, SessionOutcome::Cancelled { elapsed_secs: 10 });

    let events = drain(&mut h.events);
    assert!(matches!(events.last(), Some(Event::SessionCancelled { elapsed_secs: 10, .. })));
    assert!(!events.iter().any(|e| matches!(e, Event::SessionCompleted { .. })));

    let r = h.recorder.lock().unwrap();
    assert_eq!(r.haptic_cancels, 1);
    assert_eq!(r.animation_resets, 1);
    assert_eq!(r.loads.len(), r.unloads);
}

#[tokio::test(start_paused = true)]
async fn completed_session_is_recorded_atomically() {
    let h = spawn(TechniqueName::Resonant, 1, false, false);
    let SessionOutcome::Completed(record) = h.handle.await.unwrap() else {
        panic!("session did not complete");
    };

    let history = HistoryStore::new(MemoryStore::new());
    assert_eq!(history.record_completed(record.clone()).unwrap(), 1);
    assert_eq!(history.load_history().unwrap(), vec![record]);
}
