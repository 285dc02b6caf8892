//! Terminal stand-ins for the audio, haptic and animation devices.

use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use somaflow_core::session::AnimationRange;
use somaflow_core::{AudioBackend, Cue, CueError, HapticStyle, Haptics, PhaseAnimation, SoundId};

/// Announces cues on stderr, optionally ringing the terminal bell.
///
/// With a cue directory configured, a cue whose file is missing fails to
/// load the way a missing asset would on a device.
pub struct TerminalAudio {
    cue_dir: Option<PathBuf>,
    bell: bool,
    next_id: u64,
    loaded: HashMap<SoundId, Cue>,
}

impl TerminalAudio {
    pub fn new(cue_dir: Option<PathBuf>, bell: bool) -> Self {
        Self {
            cue_dir,
            bell,
            next_id: 0,
            loaded: HashMap::new(),
        }
    }
}

impl AudioBackend for TerminalAudio {
    fn load(&mut self, cue: Cue) -> Result<SoundId, CueError> {
        if let Some(dir) = &self.cue_dir {
            let path = dir.join(cue.file_name());
            if !path.is_file() {
                return Err(CueError::LoadFailed {
                    file: path.display().to_string(),
                    message: "file not found".to_string(),
                });
            }
        }
        self.next_id += 1;
        let id = SoundId(self.next_id);
        self.loaded.insert(id, cue);
        Ok(id)
    }

    fn play(&mut self, sound: SoundId) -> Result<(), CueError> {
        let cue = self
            .loaded
            .get(&sound)
            .ok_or_else(|| CueError::Playback(format!("sound {} is not loaded", sound.0)))?;
        tracing::debug!(cue = %cue, "playing cue");
        if self.bell {
            let mut err = std::io::stderr();
            let _ = err.write_all(b"\x07");
            let _ = err.flush();
        }
        Ok(())
    }

    fn stop(&mut self, sound: SoundId) -> Result<(), CueError> {
        tracing::trace!(sound = sound.0, "stop");
        Ok(())
    }

    fn unload(&mut self, sound: SoundId) -> Result<(), CueError> {
        self.loaded.remove(&sound);
        Ok(())
    }
}

pub struct TerminalHaptics {
    style: HapticStyle,
}

impl TerminalHaptics {
    pub fn new(style: HapticStyle) -> Self {
        Self { style }
    }
}

impl Haptics for TerminalHaptics {
    fn pulse(&mut self) -> Result<(), CueError> {
        match &self.style {
            HapticStyle::Pattern(ms) => tracing::debug!(pattern = ?ms, "vibrate"),
            HapticStyle::Impact => tracing::debug!("impact"),
            HapticStyle::Off => {}
        }
        Ok(())
    }

    fn cancel(&mut self) -> Result<(), CueError> {
        Ok(())
    }
}

/// Remembers the animation range so the progress line can draw it.
#[derive(Clone, Default)]
pub struct TerminalAnimation {
    current: Arc<Mutex<Option<AnimationRange>>>,
}

impl TerminalAnimation {
    pub fn current(&self) -> Option<AnimationRange> {
        self.current.lock().map(|g| *g).unwrap_or(None)
    }

    fn store(&self, value: Option<AnimationRange>) {
        if let Ok(mut guard) = self.current.lock() {
            *guard = value;
        }
    }
}

impl PhaseAnimation for TerminalAnimation {
    fn play(&mut self, range: AnimationRange) {
        self.store(Some(range));
    }

    fn reset(&mut self) {
        self.store(None);
    }
}

/// Circle gauge for an animation range at `fraction` of the phase.
pub fn gauge(range: AnimationRange, fraction: f64) -> String {
    const WIDTH: usize = 10;
    let from = f64::from(range.from);
    let to = f64::from(range.to);
    let level = (from + (to - from) * fraction.clamp(0.0, 1.0)) / 100.0;
    let filled = (level * WIDTH as f64).round() as usize;
    format!("{}{}", "●".repeat(filled), "○".repeat(WIDTH - filled.min(WIDTH)))
}

/// `mm:ss` for a number of seconds.
pub fn clock(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use somaflow_core::CueKind;

    #[test]
    fn gauge_fills_on_inhale_and_empties_on_exhale() {
        let inhale = AnimationRange { from: 0, to: 100 };
        assert_eq!(gauge(inhale, 0.0), "○○○○○○○○○○");
        assert_eq!(gauge(inhale, 1.0), "●●●●●●●●●●");
        let exhale = AnimationRange { from: 100, to: 0 };
        assert_eq!(gauge(exhale, 0.5), "●●●●●○○○○○");
    }

    #[test]
    fn clock_formats_minutes_and_seconds() {
        assert_eq!(clock(0), "00:00");
        assert_eq!(clock(125), "02:05");
    }

    #[test]
    fn missing_cue_file_fails_to_load() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("breathe-in-4.mp3"), b"").unwrap();
        let mut audio = TerminalAudio::new(Some(dir.path().to_path_buf()), false);

        let id = audio.load(Cue { kind: CueKind::Inhale, seconds: 4 }).unwrap();
        audio.play(id).unwrap();
        audio.unload(id).unwrap();
        assert!(audio.play(id).is_err());

        let missing = audio.load(Cue { kind: CueKind::Exhale, seconds: 6 });
        assert!(matches!(missing, Err(CueError::LoadFailed { .. })));
    }
}
