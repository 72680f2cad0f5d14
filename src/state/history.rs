//! Completion history

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::timer::{Category, Timer};
use crate::{
    error::StorageError,
    storage::{load_json, save_json, KeyValueStore, HISTORY_KEY},
};

/// Immutable record of one timer completion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub timer_id: Uuid,
    pub name: String,
    pub duration: u32,
    pub category: Category,
    pub completed_at: DateTime<Utc>,
}

impl HistoryEntry {
    /// Record the completion of `timer` at `completed_at`
    pub fn completed(timer: &Timer, completed_at: DateTime<Utc>) -> Self {
        Self {
            timer_id: timer.id(),
            name: timer.name().to_string(),
            duration: timer.duration(),
            category: timer.category(),
            completed_at,
        }
    }
}

impl fmt::Display for HistoryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} completed at {}",
            self.name,
            self.completed_at.with_timezone(&Local).format("%H:%M:%S")
        )
    }
}

/// Append-only, completion-ordered sequence of history entries
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryLog {
    entries: Vec<HistoryEntry>,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the persisted log, empty if nothing has been saved yet
    pub fn load(store: &dyn KeyValueStore) -> Result<Self, StorageError> {
        let entries = load_json(store, HISTORY_KEY)?.unwrap_or_default();
        Ok(Self { entries })
    }

    /// Persist the whole log, overwriting the previous document
    pub fn save(&self, store: &dyn KeyValueStore) -> Result<(), StorageError> {
        save_json(store, HISTORY_KEY, &self.entries)
    }

    pub fn append(&mut self, entry: HistoryEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
