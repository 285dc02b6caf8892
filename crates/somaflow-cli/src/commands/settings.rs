use clap::Subcommand;
use somaflow_core::storage::{SettingKey, Settings, SqliteStore, DURATION_PRESETS};

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Get a setting (technique, duration, sound, vibration, dark-mode)
    Get {
        key: SettingKey,
    },
    /// Change a setting; it is saved immediately
    Set {
        key: SettingKey,
        /// New value (e.g. "Box Breathing", "10min", "off")
        value: String,
    },
    /// Print every setting as JSON
    List,
    /// Restore the defaults
    Reset,
}

pub fn run(action: SettingsAction) -> Result<(), Box<dyn std::error::Error>> {
    let store = SqliteStore::open()?;

    match action {
        SettingsAction::Get { key } => {
            let settings = Settings::load(&store)?;
            println!("{}", settings.display(key));
        }
        SettingsAction::Set { key, value } => {
            let mut settings = Settings::load(&store)?;
            settings.set(&store, key, &value)?;
            if key == SettingKey::Duration && !DURATION_PRESETS.contains(&settings.duration_minutes) {
                eprintln!(
                    "note: {} min is not one of the usual lengths {:?}",
                    settings.duration_minutes, DURATION_PRESETS
                );
            }
            println!("ok");
        }
        SettingsAction::List => {
            let settings = Settings::load(&store)?;
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }
        SettingsAction::Reset => {
            Settings::default().save(&store)?;
            println!("settings reset to defaults");
        }
    }
    Ok(())
}
