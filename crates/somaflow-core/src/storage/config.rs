//! TOML-based application configuration.
//!
//! Device-level choices that are not user preferences:
//! - Haptic capability (vibration pattern, impact pulse, or none)
//! - Where the audio cue files live
//! - Progress redraw interval for terminal front ends
//!
//! Configuration is stored at `<data_dir>/config.toml`.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::cues::HapticStyle;
use crate::error::{ConfigError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HapticsMode {
    Pattern,
    Impact,
    Off,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HapticsConfig {
    #[serde(default = "default_haptics_mode")]
    pub style: HapticsMode,
    #[serde(default = "default_pattern_ms")]
    pub pattern_ms: Vec<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Directory holding `breathe-in-*.mp3` / `breathe-out-*.mp3`.
    #[serde(default)]
    pub cue_dir: Option<String>,
    #[serde(default = "default_true")]
    pub bell: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_refresh_ms")]
    pub refresh_ms: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub haptics: HapticsConfig,
    #[serde(default)]
    pub audio: AudioConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

fn default_haptics_mode() -> HapticsMode {
    HapticsMode::Pattern
}
fn default_pattern_ms() -> Vec<u64> {
    HapticStyle::DEFAULT_PATTERN_MS.to_vec()
}
fn default_true() -> bool {
    true
}
fn default_refresh_ms() -> u64 {
    1000
}

impl Default for HapticsConfig {
    fn default() -> Self {
        Self {
            style: default_haptics_mode(),
            pattern_ms: default_pattern_ms(),
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            cue_dir: None,
            bell: true,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            refresh_ms: default_refresh_ms(),
        }
    }
}

impl Config {
    pub fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk, writing the defaults on first use.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be parsed, or if
    /// the defaults cannot be written.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| {
                ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                }
                .into()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Load from disk, returning the defaults on any error.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "failed to load config, using defaults");
            Self::default()
        })
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Haptic capability selected by this configuration.
    pub fn haptic_style(&self) -> HapticStyle {
        match self.haptics.style {
            HapticsMode::Pattern => HapticStyle::Pattern(self.haptics.pattern_ms.clone()),
            HapticsMode::Impact => HapticStyle::Impact,
            HapticsMode::Off => HapticStyle::Off,
        }
    }

    /// Value at a dot-separated key such as `haptics.style`.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let mut current = &json;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        match current {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a dot-separated key from its textual form and save.
    ///
    /// The new value is parsed according to the type of the current one;
    /// the whole config must still deserialize afterwards.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.apply(key, value)?;
        self.save()
    }

    fn apply(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut json = serde_json::to_value(&*self).map_err(|e| invalid(e.to_string()))?;
        let (parent_path, leaf) = key.rsplit_once('.').ok_or_else(unknown)?;

        let mut parent = &mut json;
        for part in parent_path.split('.') {
            parent = parent.get_mut(part).ok_or_else(unknown)?;
        }
        let obj = parent.as_object_mut().ok_or_else(unknown)?;
        let existing = obj.get(leaf).ok_or_else(unknown)?;

        let new_value = match existing {
            serde_json::Value::Bool(_) => serde_json::Value::Bool(
                value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
            ),
            serde_json::Value::Number(_) => serde_json::Value::Number(
                value.parse::<u64>().map_err(|e| invalid(e.to_string()))?.into(),
            ),
            serde_json::Value::Array(_) => {
                serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
            }
            serde_json::Value::Null if value.is_empty() || value == "none" => serde_json::Value::Null,
            _ => serde_json::Value::String(value.to_string()),
        };
        obj.insert(leaf.to_string(), new_value);

        *self = serde_json::from_value(json).map_err(|e| invalid(e.to_string()))?;
        Ok(())
    }
}
