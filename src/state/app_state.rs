//! Main application state shared with the HTTP handlers

use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
    time::Instant,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use super::{Timer, TimerDraft, TimerStore};
use crate::{
    error::TimerError,
    services::{share_file, write_history_file, ExportSettings},
};

/// Result of a successful history export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportReport {
    pub path: PathBuf,
    pub entries: usize,
    pub shared: bool,
}

/// Application state: the timer store plus server metadata
pub struct AppState {
    /// Timers, history and the ticker
    pub store: Arc<TimerStore>,
    /// Where and how the history is exported
    pub export: ExportSettings,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Mutex<Option<String>>,
    pub last_action_time: Mutex<Option<DateTime<Utc>>>,
    /// Most recent halfway or completion alert
    pub last_alert: Mutex<Option<String>>,
}

impl AppState {
    pub fn new(store: Arc<TimerStore>, host: String, port: u16, export: ExportSettings) -> Self {
        Self {
            store,
            export,
            start_time: Instant::now(),
            port,
            host,
            last_action: Mutex::new(None),
            last_action_time: Mutex::new(None),
            last_alert: Mutex::new(None),
        }
    }

    /// Create a timer and remember the action
    pub fn add_timer(&self, draft: TimerDraft) -> Result<Timer, TimerError> {
        let timer = self.store.add_timer(draft)?;
        self.record_action("add");
        Ok(timer)
    }

    pub fn start_timer(&self, id: Uuid) -> Result<Option<Timer>, TimerError> {
        let timer = self.store.start(id)?;
        self.record_action("start");
        Ok(timer)
    }

    pub fn pause_timer(&self, id: Uuid) -> Result<Option<Timer>, TimerError> {
        let timer = self.store.pause(id)?;
        self.record_action("pause");
        Ok(timer)
    }

    pub fn reset_timer(&self, id: Uuid) -> Result<Option<Timer>, TimerError> {
        let timer = self.store.reset(id)?;
        self.record_action("reset");
        Ok(timer)
    }

    /// Write the whole history to the export file, then hand it to the share
    /// command if one is configured
    pub async fn export_history(&self) -> Result<ExportReport, TimerError> {
        let entries = self.store.history()?;
        let path = write_history_file(&entries, &self.export.dir).await?;

        let shared = match self.export.share_command.as_deref() {
            Some(command) => {
                share_file(command, &path).await?;
                true
            }
            None => false,
        };

        self.record_action("export");
        Ok(ExportReport {
            path,
            entries: entries.len(),
            shared,
        })
    }

    /// Remember the most recent user action
    pub fn record_action(&self, action: &str) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }

    pub fn record_alert(&self, message: String) {
        info!("Alert: {}", message);
        if let Ok(mut last_alert) = self.last_alert.lock() {
            *last_alert = Some(message);
        }
    }

    pub fn last_alert(&self) -> Option<String> {
        self.last_alert.lock().ok().and_then(|a| a.clone())
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let seconds = self.start_time.elapsed().as_secs();
        let hours = seconds / 3600;
        let minutes = (seconds % 3600) / 60;
        let seconds = seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }
}
