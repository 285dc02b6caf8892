//! Audio, haptic and animation collaborators.
//!
//! The core never talks to a device. Front ends implement [`AudioBackend`],
//! [`Haptics`] and [`PhaseAnimation`]; [`CueDispatcher`] decides which of
//! them fire on each phase.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CueError;
use crate::session::{AnimationRange, Phase, PhaseStep};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CueKind {
    Inhale,
    Exhale,
}

/// A spoken breathing cue recorded for one specific phase length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cue {
    pub kind: CueKind,
    pub seconds: u32,
}

impl Cue {
    pub fn file_name(&self) -> String {
        match self.kind {
            CueKind::Inhale => format!("breathe-in-{}.mp3", self.seconds),
            CueKind::Exhale => format!("breathe-out-{}.mp3", self.seconds),
        }
    }
}

impl fmt::Display for Cue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.file_name())
    }
}

/// The set of cues that exist.
#[derive(Debug, Clone, Default)]
pub struct CueLibrary {
    cues: BTreeSet<Cue>,
}

impl CueLibrary {
    /// Cues shipped with the app: inhale 4s, exhale 4s/6s/8s.
    pub fn bundled() -> Self {
        let mut cues = BTreeSet::new();
        cues.insert(Cue { kind: CueKind::Inhale, seconds: 4 });
        for seconds in [4, 6, 8] {
            cues.insert(Cue { kind: CueKind::Exhale, seconds });
        }
        Self { cues }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Cue for a phase, if one was recorded for that phase and duration.
    pub fn lookup(&self, step: &PhaseStep) -> Option<Cue> {
        let kind = match step.phase {
            Phase::Inhale => CueKind::Inhale,
            Phase::Exhale => CueKind::Exhale,
            Phase::HoldIn | Phase::HoldOut => return None,
        };
        let cue = Cue { kind, seconds: step.duration_secs };
        self.cues.contains(&cue).then_some(cue)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Cue> {
        self.cues.iter()
    }
}

/// Opaque handle to a loaded sound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SoundId(pub u64);

/// Audio device capability.
pub trait AudioBackend: Send {
    fn load(&mut self, cue: Cue) -> Result<SoundId, CueError>;
    fn play(&mut self, sound: SoundId) -> Result<(), CueError>;
    fn stop(&mut self, sound: SoundId) -> Result<(), CueError>;
    fn unload(&mut self, sound: SoundId) -> Result<(), CueError>;
}

/// Plays cues through a backend while holding at most one loaded sound.
pub struct CuePlayer {
    backend: Box<dyn AudioBackend>,
    library: CueLibrary,
    current: Option<SoundId>,
}

impl CuePlayer {
    pub fn new(backend: Box<dyn AudioBackend>, library: CueLibrary) -> Self {
        Self {
            backend,
            library,
            current: None,
        }
    }

    pub fn library(&self) -> &CueLibrary {
        &self.library
    }

    pub fn has_loaded_sound(&self) -> bool {
        self.current.is_some()
    }

    /// Play the cue for `step`, replacing any previously loaded sound.
    ///
    /// A missing cue is not an error: nothing is loaded and `Ok(None)`
    /// comes back.
    pub fn play_for(&mut self, step: &PhaseStep) -> Result<Option<Cue>, CueError> {
        let Some(cue) = self.library.lookup(step) else {
            tracing::debug!(phase = step.phase.label(), secs = step.duration_secs, "no cue for phase");
            return Ok(None);
        };
        self.unload_current()?;
        let sound = self.backend.load(cue)?;
        self.current = Some(sound);
        self.backend.play(sound)?;
        Ok(Some(cue))
    }

    /// Stop and unload the held sound, if any.
    ///
    /// The handle is always unloaded, even when stopping it fails; the
    /// first error is reported.
    pub fn release(&mut self) -> Result<(), CueError> {
        let Some(sound) = self.current.take() else {
            return Ok(());
        };
        let stopped = self.backend.stop(sound);
        let unloaded = self.backend.unload(sound);
        stopped.and(unloaded)
    }

    fn unload_current(&mut self) -> Result<(), CueError> {
        if let Some(sound) = self.current.take() {
            self.backend.unload(sound)?;
        }
        Ok(())
    }
}

impl fmt::Debug for CuePlayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CuePlayer")
            .field("library", &self.library)
            .field("current", &self.current)
            .finish()
    }
}

/// How a device signals a breath. Picked once at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HapticStyle {
    /// Vibration pattern in milliseconds (wait, vibrate, wait, ...).
    Pattern(Vec<u64>),
    /// A single medium impact pulse.
    Impact,
    Off,
}

impl HapticStyle {
    pub const DEFAULT_PATTERN_MS: [u64; 3] = [500, 600, 500];
}

/// Haptic device capability.
pub trait Haptics: Send {
    fn pulse(&mut self) -> Result<(), CueError>;
    fn cancel(&mut self) -> Result<(), CueError>;
}

/// Breathing animation capability.
pub trait PhaseAnimation: Send {
    fn play(&mut self, range: AnimationRange);
    fn reset(&mut self);
}

/// Applies the cue rules for each phase:
/// sound only on inhale/exhale when enabled and a cue exists,
/// haptics on every non-hold phase when enabled.
pub struct CueDispatcher {
    player: CuePlayer,
    haptics: Box<dyn Haptics>,
    animation: Box<dyn PhaseAnimation>,
    sound_enabled: bool,
    vibration_enabled: bool,
}

impl CueDispatcher {
    pub fn new(
        player: CuePlayer,
        haptics: Box<dyn Haptics>,
        animation: Box<dyn PhaseAnimation>,
        sound_enabled: bool,
        vibration_enabled: bool,
    ) -> Self {
        Self {
            player,
            haptics,
            animation,
            sound_enabled,
            vibration_enabled,
        }
    }

    pub fn player(&self) -> &CuePlayer {
        &self.player
    }

    pub fn on_phase(&mut self, step: &PhaseStep) {
        self.animation.play(step.phase.animation_range());

        if self.sound_enabled {
            if let Err(e) = self.player.play_for(step) {
                tracing::warn!(error = %e, phase = step.phase.label(), "audio cue failed");
            }
        }

        if self.vibration_enabled && !step.phase.is_hold() {
            if let Err(e) = self.haptics.pulse() {
                tracing::warn!(error = %e, "haptic pulse failed");
            }
        }
    }

    /// Stop every running side effect: audio, vibration, animation.
    pub fn halt(&mut self) {
        if let Err(e) = self.player.release() {
            tracing::warn!(error = %e, "failed to release audio cue");
        }
        if let Err(e) = self.haptics.cancel() {
            tracing::warn!(error = %e, "failed to cancel vibration");
        }
        self.animation.reset();
    }
}

impl fmt::Debug for CueDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CueDispatcher")
            .field("player", &self.player)
            .field("sound_enabled", &self.sound_enabled)
            .field("vibration_enabled", &self.vibration_enabled)
            .finish()
    }
}
