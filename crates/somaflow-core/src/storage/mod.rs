mod config;
mod history;
mod kv;
mod settings;

pub use config::{AudioConfig, Config, DisplayConfig, HapticsConfig, HapticsMode};
pub use history::{HistoryStore, SessionRecord, HISTORY_CAP, HISTORY_KEY, TOTAL_SESSIONS_KEY};
pub use kv::{KeyValueStore, MemoryStore, SqliteStore};
pub use settings::{SettingKey, Settings, DURATION_PRESETS};

use std::path::PathBuf;

use crate::error::StorageError;

/// Returns the directory holding the store and the config file.
///
/// `SOMAFLOW_DATA_DIR` overrides the location outright. Otherwise this is
/// `~/.config/somaflow[-dev]/`, with the `-dev` suffix when
/// `SOMAFLOW_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, StorageError> {
    let dir = match std::env::var_os("SOMAFLOW_DATA_DIR") {
        Some(custom) => PathBuf::from(custom),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("SOMAFLOW_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("somaflow-dev")
            } else {
                base_dir.join("somaflow")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| StorageError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
