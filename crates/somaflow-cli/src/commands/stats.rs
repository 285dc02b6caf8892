use chrono::Local;
use somaflow_core::storage::{HistoryStore, SqliteStore};
use somaflow_core::{ProgressReport, Summary};

pub fn run_summary() -> Result<(), Box<dyn std::error::Error>> {
    let history = HistoryStore::new(SqliteStore::open()?);
    let summary = Summary::build(&history.load_history()?, history.load_total()?, &Local::now());
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

pub fn run_progress() -> Result<(), Box<dyn std::error::Error>> {
    let history = HistoryStore::new(SqliteStore::open()?);
    let report = ProgressReport::build(&history.load_history()?, history.load_total()?, &Local::now());
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
