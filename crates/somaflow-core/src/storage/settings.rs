//! User preferences kept in the key-value store.
//!
//! Each field lives under its own key and is written the moment it
//! changes. Reading never fails on missing or garbled values: the field's
//! default is used instead.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::kv::KeyValueStore;
use crate::error::{Result, StorageError, ValidationError};
use crate::technique::TechniqueName;

/// Session lengths offered by the settings surface, in minutes.
pub const DURATION_PRESETS: [u32; 5] = [2, 5, 10, 15, 20];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKey {
    Technique,
    Duration,
    Sound,
    Vibration,
    DarkMode,
}

impl SettingKey {
    pub const ALL: [SettingKey; 5] = [
        SettingKey::Technique,
        SettingKey::Duration,
        SettingKey::Sound,
        SettingKey::Vibration,
        SettingKey::DarkMode,
    ];

    /// Key under which the value is persisted.
    pub fn storage_key(&self) -> &'static str {
        match self {
            SettingKey::Technique => "breathingTechnique",
            SettingKey::Duration => "sessionDuration",
            SettingKey::Sound => "isSoundEnabled",
            SettingKey::Vibration => "isVibrationEnabled",
            SettingKey::DarkMode => "isDarkModeEnabled",
        }
    }

    pub fn alias(&self) -> &'static str {
        match self {
            SettingKey::Technique => "technique",
            SettingKey::Duration => "duration",
            SettingKey::Sound => "sound",
            SettingKey::Vibration => "vibration",
            SettingKey::DarkMode => "dark-mode",
        }
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.alias())
    }
}

impl FromStr for SettingKey {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SettingKey::ALL
            .into_iter()
            .find(|k| k.alias() == s || k.storage_key() == s || k.alias().replace('-', "_") == s)
            .ok_or_else(|| ValidationError::UnknownSetting(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub technique: TechniqueName,
    pub duration_minutes: u32,
    pub sound_enabled: bool,
    pub vibration_enabled: bool,
    pub dark_mode_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            technique: TechniqueName::Resonant,
            duration_minutes: 5,
            sound_enabled: true,
            vibration_enabled: true,
            dark_mode_enabled: false,
        }
    }
}

impl Settings {
    /// Read every field, defaulting the ones that are missing or unreadable.
    ///
    /// # Errors
    /// Only storage failures are reported.
    pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> Result<Self, StorageError> {
        let defaults = Self::default();
        Ok(Self {
            technique: store
                .get(SettingKey::Technique.storage_key())?
                .map(|raw| TechniqueName::from_stored(&raw))
                .unwrap_or(defaults.technique),
            duration_minutes: read_field(store, SettingKey::Duration, parse_duration)?
                .unwrap_or(defaults.duration_minutes),
            sound_enabled: read_field(store, SettingKey::Sound, parse_bool)?
                .unwrap_or(defaults.sound_enabled),
            vibration_enabled: read_field(store, SettingKey::Vibration, parse_bool)?
                .unwrap_or(defaults.vibration_enabled),
            dark_mode_enabled: read_field(store, SettingKey::DarkMode, parse_bool)?
                .unwrap_or(defaults.dark_mode_enabled),
        })
    }

    /// Like [`Settings::load`], but a storage failure yields the defaults.
    pub fn load_or_default<S: KeyValueStore + ?Sized>(store: &S) -> Self {
        Self::load(store).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "failed to load settings, using defaults");
            Self::default()
        })
    }

    /// Validate `raw`, update the field and persist it immediately.
    ///
    /// `self` is only updated once the store has accepted the new value.
    pub fn set<S: KeyValueStore + ?Sized>(&mut self, store: &S, key: SettingKey, raw: &str) -> Result<()> {
        let mut updated = self.clone();
        match key {
            SettingKey::Technique => updated.technique = raw.parse()?,
            SettingKey::Duration => {
                updated.duration_minutes = parse_duration(raw)
                    .ok_or_else(|| ValidationError::InvalidDuration(raw.to_string()))?
            }
            SettingKey::Sound => updated.sound_enabled = parse_bool_arg(key, raw)?,
            SettingKey::Vibration => updated.vibration_enabled = parse_bool_arg(key, raw)?,
            SettingKey::DarkMode => updated.dark_mode_enabled = parse_bool_arg(key, raw)?,
        }
        store.set(key.storage_key(), &updated.encoded(key))?;
        *self = updated;
        Ok(())
    }

    /// Persist every field.
    pub fn save<S: KeyValueStore + ?Sized>(&self, store: &S) -> Result<(), StorageError> {
        let entries: Vec<(&str, String)> = SettingKey::ALL
            .into_iter()
            .map(|k| (k.storage_key(), self.encoded(k)))
            .collect();
        store.set_many(&entries)
    }

    /// Value as written to the store.
    pub fn encoded(&self, key: SettingKey) -> String {
        match key {
            SettingKey::Technique => self.technique.as_str().to_string(),
            SettingKey::Duration => format!("{}min", self.duration_minutes),
            SettingKey::Sound => self.sound_enabled.to_string(),
            SettingKey::Vibration => self.vibration_enabled.to_string(),
            SettingKey::DarkMode => self.dark_mode_enabled.to_string(),
        }
    }

    /// Value as shown to the user.
    pub fn display(&self, key: SettingKey) -> String {
        match key {
            SettingKey::Duration => self.duration_minutes.to_string(),
            _ => self.encoded(key),
        }
    }
}

fn read_field<S, T>(store: &S, key: SettingKey, parse: fn(&str) -> Option<T>) -> Result<Option<T>, StorageError>
where
    S: KeyValueStore + ?Sized,
{
    let Some(raw) = store.get(key.storage_key())? else {
        return Ok(None);
    };
    let parsed = parse(&raw);
    if parsed.is_none() {
        tracing::warn!(key = key.storage_key(), value = %raw, "unreadable setting, using default");
    }
    Ok(parsed)
}

/// Accepts `10min` as well as a bare `10`.
fn parse_duration(raw: &str) -> Option<u32> {
    let digits = raw.trim().trim_end_matches("min").trim();
    digits.parse::<u32>().ok().filter(|&m| m > 0)
}

fn parse_bool(raw: &str) -> Option<bool> {
    serde_json::from_str::<bool>(raw.trim()).ok()
}

fn parse_bool_arg(key: SettingKey, raw: &str) -> Result<bool, ValidationError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Ok(true),
        "false" | "off" | "no" | "0" => Ok(false),
        _ => Err(ValidationError::InvalidValue {
            field: key.alias().to_string(),
            message: format!("expected on/off, got '{raw}'"),
        }),
    }
}
