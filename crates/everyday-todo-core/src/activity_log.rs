//! Check/uncheck history.
//!
//! Append-only, capped to the most recent [`LOG_CAPACITY`] entries, read
//! newest first.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::storage::{keys, Database};
use crate::task::Task;

/// Entries kept after every write.
pub const LOG_CAPACITY: usize = 100;

/// What happened to the task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogAction {
    Check,
    Uncheck,
}

impl std::fmt::Display for LogAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogAction::Check => f.pad("check"),
            LogAction::Uncheck => f.pad("uncheck"),
        }
    }
}

/// One logged toggle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub id: i64,
    pub todo_id: i64,
    pub todo_text: String,
    pub period: String,
    pub action: LogAction,
    pub timestamp: DateTime<Utc>,
}

/// The `logs` document.
pub struct ActivityLog<'a> {
    db: &'a Database,
}

impl<'a> ActivityLog<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// All entries, oldest first.
    pub fn load(&self) -> Vec<LogEntry> {
        self.db.load_document(keys::LOGS)
    }

    /// Store `entries`, keeping only the newest [`LOG_CAPACITY`].
    pub fn save(&self, entries: &[LogEntry]) -> Result<()> {
        let start = entries.len().saturating_sub(LOG_CAPACITY);
        self.db.save_document(keys::LOGS, &entries[start..])
    }

    pub fn add(&self, task: &Task, action: LogAction, now: DateTime<Utc>) -> Result<LogEntry> {
        let mut entries = self.load();
        let now_ms = now.timestamp_millis();
        let id = match entries.last() {
            Some(last) if last.id >= now_ms => last.id + 1,
            _ => now_ms,
        };
        let entry = LogEntry {
            id,
            todo_id: task.id,
            todo_text: task.text.clone(),
            period: task.period_id.clone(),
            action,
            timestamp: now,
        };
        entries.push(entry.clone());
        self.save(&entries)?;
        Ok(entry)
    }

    /// Newest first, at most `limit` entries (all when `None`).
    pub fn recent(&self, limit: Option<usize>) -> Vec<LogEntry> {
        let entries = self.load();
        let take = limit.unwrap_or(entries.len());
        entries.into_iter().rev().take(take).collect()
    }

    pub fn clear(&self) -> Result<()> {
        self.save(&[])
    }
}
