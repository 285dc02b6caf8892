use clap::Subcommand;
use somaflow_core::storage::{HistoryStore, SqliteStore};

#[derive(Subcommand)]
pub enum HistoryAction {
    /// List recorded sessions, newest first
    List {
        /// Show at most this many sessions
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Print the all-time session count
    Total,
    /// Delete the history and reset the session count
    Clear,
}

pub fn run(action: HistoryAction) -> Result<(), Box<dyn std::error::Error>> {
    let history = HistoryStore::new(SqliteStore::open()?);

    match action {
        HistoryAction::List { limit } => {
            let mut records = history.load_history()?;
            if let Some(limit) = limit {
                records.truncate(limit);
            }
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
        HistoryAction::Total => {
            println!("{}", history.load_total()?);
        }
        HistoryAction::Clear => {
            history.clear()?;
            println!("history cleared");
        }
    }
    Ok(())
}
