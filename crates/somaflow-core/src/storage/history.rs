//! Completed-session history and the all-time session counter.

use chrono::{DateTime, FixedOffset, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::kv::KeyValueStore;
use crate::error::{Result, StorageError};
use crate::technique::TechniqueName;

pub const HISTORY_KEY: &str = "breathingHistory";
pub const TOTAL_SESSIONS_KEY: &str = "totalSessions";

/// Most recent sessions kept in history.
pub const HISTORY_CAP: usize = 30;

/// One completed session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub technique: TechniqueName,
    /// Session length in minutes.
    pub duration: u32,
    /// ISO-8601 completion time, e.g. `2025-03-02T09:15:00.000Z`.
    pub date: String,
}

impl SessionRecord {
    pub fn new(technique: TechniqueName, duration: u32, completed_at: DateTime<Utc>) -> Self {
        Self {
            technique,
            duration,
            date: completed_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    /// Parsed completion time, `None` if the stored date is malformed.
    pub fn timestamp(&self) -> Option<DateTime<FixedOffset>> {
        DateTime::parse_from_rfc3339(&self.date).ok()
    }
}

/// History and counter stored as `breathingHistory` (JSON array, newest
/// first) and `totalSessions` (decimal string).
pub struct HistoryStore<S> {
    store: S,
}

impl<S: KeyValueStore> HistoryStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Newest first; empty when nothing was recorded yet.
    pub fn load_history(&self) -> Result<Vec<SessionRecord>> {
        match self.store.get(HISTORY_KEY)? {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(Vec::new()),
        }
    }

    /// All-time completed sessions; 0 when absent.
    pub fn load_total(&self) -> Result<u64> {
        match self.store.get(TOTAL_SESSIONS_KEY)? {
            Some(raw) => raw.trim().parse::<u64>().map_err(|e| {
                StorageError::Corrupt {
                    key: TOTAL_SESSIONS_KEY.to_string(),
                    message: e.to_string(),
                }
                .into()
            }),
            None => Ok(0),
        }
    }

    /// Prepend `record`, keeping the newest [`HISTORY_CAP`] entries.
    pub fn append_session(&self, record: SessionRecord) -> Result<()> {
        let json = self.history_with(record)?;
        self.store.set(HISTORY_KEY, &json)?;
        Ok(())
    }

    /// Bump the counter and return its new value.
    pub fn increment_total(&self) -> Result<u64> {
        let total = self.load_total()? + 1;
        self.store.set(TOTAL_SESSIONS_KEY, &total.to_string())?;
        Ok(total)
    }

    /// Record a completed session: history and counter are written in one
    /// batch, so they cannot drift apart.
    pub fn record_completed(&self, record: SessionRecord) -> Result<u64> {
        let json = self.history_with(record)?;
        let total = self.load_total()? + 1;
        self.store.set_many(&[
            (HISTORY_KEY, json),
            (TOTAL_SESSIONS_KEY, total.to_string()),
        ])?;
        tracing::info!(total, "session recorded");
        Ok(total)
    }

    pub fn clear(&self) -> Result<()> {
        self.store.remove(HISTORY_KEY)?;
        self.store.remove(TOTAL_SESSIONS_KEY)?;
        Ok(())
    }

    fn history_with(&self, record: SessionRecord) -> Result<String> {
        let mut history = self.load_history()?;
        history.insert(0, record);
        history.truncate(HISTORY_CAP);
        Ok(serde_json::to_string(&history)?)
    }
}
