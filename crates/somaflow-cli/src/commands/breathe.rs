use std::future::Future;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local, TimeZone};
use clap::Args;
use somaflow_core::storage::{HistoryStore, KeyValueStore, SessionRecord, Settings, SqliteStore};
use somaflow_core::{
    Config, CueDispatcher, CueLibrary, CuePlayer, Event, HapticStyle, ProgressClock, SessionEngine,
    SessionOutcome, SessionRunner, Summary, TechniqueName,
};
use tokio::sync::{mpsc, watch};

use crate::terminal::{clock, gauge, TerminalAnimation, TerminalAudio, TerminalHaptics};

#[derive(Args)]
pub struct BreatheArgs {
    /// Technique for this session only (defaults to the saved setting)
    #[arg(long, short)]
    technique: Option<TechniqueName>,
    /// Length in minutes for this session only
    #[arg(long, short)]
    minutes: Option<u32>,
    /// Print session events as JSON lines instead of the progress display
    #[arg(long)]
    json: bool,
    /// Do not save the session to history
    #[arg(long)]
    no_record: bool,
}

pub fn run(args: BreatheArgs) -> Result<(), Box<dyn std::error::Error>> {
    let store = SqliteStore::open()?;
    let settings = Settings::load_or_default(&store);
    let config = Config::load_or_default();

    let technique = args.technique.unwrap_or(settings.technique);
    let minutes = args.minutes.unwrap_or(settings.duration_minutes);
    let engine = SessionEngine::new(technique, minutes)?;

    let haptic_style = config.haptic_style();
    let animation = TerminalAnimation::default();
    let cues = CueDispatcher::new(
        CuePlayer::new(
            Box::new(TerminalAudio::new(
                config.audio.cue_dir.as_deref().map(PathBuf::from),
                config.audio.bell,
            )),
            CueLibrary::bundled(),
        ),
        Box::new(TerminalHaptics::new(haptic_style.clone())),
        Box::new(animation.clone()),
        settings.sound_enabled,
        settings.vibration_enabled && haptic_style != HapticStyle::Off,
    );

    if !args.json {
        eprintln!(
            "{} minute {} session. Enter pauses and continues, Ctrl-C stops.",
            minutes, technique
        );
    }

    let view = View::new(args.json, animation);
    let refresh = Duration::from_millis(config.display.refresh_ms.max(50));
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let outcome = runtime.block_on(drive(
        engine,
        cues,
        view,
        refresh,
        spawn_input_reader(),
        interrupted(),
    ))?;

    match outcome {
        SessionOutcome::Completed(record) => {
            tracing::info!(technique = %record.technique, minutes = record.duration, "session completed");
            let summary = complete(&store, record, !args.no_record, &Local::now())?;
            println!("{}", render_summary(&summary, args.json)?);
        }
        SessionOutcome::Cancelled { elapsed_secs } => {
            if !args.json {
                println!("Session stopped after {}.", clock(elapsed_secs));
            }
        }
    }
    Ok(())
}

/// Save a finished session unless `save` is off, then build the summary.
fn complete<S: KeyValueStore, Tz: TimeZone>(
    store: S,
    record: SessionRecord,
    save: bool,
    now: &DateTime<Tz>,
) -> somaflow_core::Result<Summary> {
    let history = HistoryStore::new(store);
    if save {
        history.record_completed(record)?;
    }
    Ok(Summary::build(&history.load_history()?, history.load_total()?, now))
}

/// Run the session until it completes or `cancel` resolves.
///
/// Every message on `toggles` flips between running and paused.
async fn drive<C>(
    engine: SessionEngine,
    cues: CueDispatcher,
    mut view: View,
    refresh: Duration,
    mut toggles: mpsc::UnboundedReceiver<()>,
    cancel: C,
) -> Result<SessionOutcome, tokio::task::JoinError>
where
    C: Future<Output = ()>,
{
    let (control_tx, control_rx) = watch::channel(true);
    let mut control = Some(control_tx);
    let (event_tx, mut events) = mpsc::unbounded_channel();
    let mut session = tokio::spawn(SessionRunner::new(engine, cues, event_tx).run(control_rx));

    let mut input_open = true;
    let mut ticker = tokio::time::interval(refresh);
    tokio::pin!(cancel);

    loop {
        tokio::select! {
            outcome = &mut session => {
                while let Ok(event) = events.try_recv() {
                    view.on_event(&event);
                }
                view.finish();
                return outcome;
            }
            Some(event) = events.recv() => view.on_event(&event),
            line = toggles.recv(), if input_open => match line {
                Some(()) => {
                    if let Some(tx) = &control {
                        tx.send_modify(|running| *running = !*running);
                    }
                }
                None => input_open = false,
            },
            _ = ticker.tick() => view.redraw(),
            () = &mut cancel, if control.is_some() => {
                // Dropping the sender cancels the run.
                control = None;
            }
        }
    }
}

/// Resolves on Ctrl-C. Never resolves if the signal cannot be watched.
async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "cannot listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

/// Each line on stdin is a pause/continue toggle.
fn spawn_input_reader() -> mpsc::UnboundedReceiver<()> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            if line.is_err() || tx.send(()).is_err() {
                break;
            }
        }
    });
    rx
}

struct CurrentPhase {
    label: String,
    started: Instant,
    duration: Duration,
}

struct View {
    json: bool,
    progress: ProgressClock,
    phase: Option<CurrentPhase>,
    paused: bool,
    animation: TerminalAnimation,
}

impl View {
    fn new(json: bool, animation: TerminalAnimation) -> Self {
        Self {
            json,
            progress: ProgressClock::new(Duration::ZERO),
            phase: None,
            paused: false,
            animation,
        }
    }

    fn on_event(&mut self, event: &Event) {
        if self.json {
            match serde_json::to_string(event) {
                Ok(line) => println!("{line}"),
                Err(e) => tracing::warn!(error = %e, "failed to encode event"),
            }
        }

        let now = Instant::now();
        match event {
            Event::SessionStarted { target_secs, .. } => {
                self.progress = ProgressClock::new(Duration::from_secs(*target_secs));
                self.progress.resume(Duration::ZERO, now);
            }
            Event::SessionResumed { elapsed_secs, .. } => {
                self.paused = false;
                self.progress.resume(Duration::from_secs(*elapsed_secs), now);
            }
            Event::SessionPaused { elapsed_secs, .. } => {
                self.paused = true;
                self.phase = None;
                self.progress.pause(Duration::from_secs(*elapsed_secs));
            }
            Event::PhaseEntered { label, duration_secs, .. } => {
                self.phase = Some(CurrentPhase {
                    label: label.clone(),
                    started: now,
                    duration: Duration::from_secs(u64::from(*duration_secs)),
                });
            }
            Event::SessionCompleted { .. } | Event::SessionCancelled { .. } => {
                self.phase = None;
            }
            Event::StateSnapshot { .. } => {}
        }
        self.redraw();
    }

    fn redraw(&self) {
        if self.json {
            return;
        }
        let now = Instant::now();
        let elapsed = self.progress.elapsed(now).as_secs();
        let remaining = self.progress.remaining(now).as_secs();
        let percent = (self.progress.fraction(now) * 100.0).round();

        let phase = match (&self.phase, self.animation.current()) {
            (Some(current), Some(range)) => {
                let fraction = if current.duration.is_zero() {
                    1.0
                } else {
                    now.saturating_duration_since(current.started).as_secs_f64() / current.duration.as_secs_f64()
                };
                format!("{:<9} {}", current.label, gauge(range, fraction))
            }
            _ if self.paused => format!("{:<9} {}", "Paused", " ".repeat(10)),
            _ => " ".repeat(20),
        };

        let mut err = std::io::stderr();
        let _ = write!(
            err,
            "\r{phase}  {} / -{}  {:>3}%",
            clock(elapsed),
            clock(remaining),
            percent
        );
        let _ = err.flush();
    }

    fn finish(&self) {
        if !self.json {
            eprintln!();
        }
    }
}

fn render_summary(summary: &Summary, json: bool) -> serde_json::Result<String> {
    if json {
        return serde_json::to_string(summary);
    }
    let mut out = String::from("Session complete");
    if let Some(last) = &summary.last_session {
        out.push_str(&format!("\n  Technique:        {}", last.technique));
        out.push_str(&format!("\n  Duration:         {} min", last.duration));
    }
    if let Some(description) = summary.last_session_description {
        out.push_str(&format!("\n  {description}"));
    }
    out.push_str(&format!("\n  Total sessions:   {}", summary.total_sessions));
    out.push_str(&format!("\n  This week:        {}", summary.sessions_this_week));
    Ok(out)
}
