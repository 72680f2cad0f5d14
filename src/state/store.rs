//! Timer store: the timer collection, its history and their persistence

use std::{
    collections::HashSet,
    sync::{Arc, Mutex},
    time::Duration,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::{
    history::{HistoryEntry, HistoryLog},
    timer::{Timer, TimerDraft},
};
use crate::{
    error::{StorageError, TimerError},
    storage::{load_json, save_json, KeyValueStore, TIMERS_KEY},
    tasks::Ticker,
};

/// How many recent persistence failures are kept for the status report
const MAX_RECORDED_ERRORS: usize = 20;

/// Notifications emitted while ticking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum TimerEvent {
    /// A timer with the halfway alert reached half of its duration
    Halfway { id: Uuid, name: String, remaining: u32 },
    /// A timer reached zero and was logged to history
    Completed { entry: HistoryEntry },
}

/// Summary of one tick pass
#[derive(Debug, Clone, Default)]
pub struct TickReport {
    pub advanced: Vec<Uuid>,
    pub halfway: Vec<Uuid>,
    pub completed: Vec<HistoryEntry>,
}

/// Owner of all timers and the completion history.
///
/// Every mutation is written through to storage while the collection lock is
/// held, so stored snapshots always land in mutation order.
pub struct TimerStore {
    storage: Arc<dyn KeyValueStore>,
    timers: Mutex<Vec<Timer>>,
    history: Mutex<HistoryLog>,
    persistence_errors: Mutex<Vec<String>>,
    events_tx: broadcast::Sender<TimerEvent>,
    ticker: Ticker,
}

impl TimerStore {
    /// Load persisted timers and history and build a store around them.
    ///
    /// Unreadable documents are logged, copied to `<key>.corrupt` and treated
    /// as empty; individual timer records that fail validation are skipped.
    pub fn open(storage: Arc<dyn KeyValueStore>, tick_period: Duration) -> Self {
        let mut errors = Vec::new();

        let timers = load_timers(storage.as_ref()).unwrap_or_else(|e| {
            error!("Failed to load timers: {}", e);
            errors.push(format!("Failed to load timers: {}", e));
            preserve_corrupt(storage.as_ref(), &e, &mut errors);
            Vec::new()
        });

        let history = HistoryLog::load(storage.as_ref()).unwrap_or_else(|e| {
            error!("Failed to load history: {}", e);
            errors.push(format!("Failed to load history: {}", e));
            preserve_corrupt(storage.as_ref(), &e, &mut errors);
            HistoryLog::new()
        });

        info!(
            "Loaded {} timers and {} history entries",
            timers.len(),
            history.len()
        );

        let (events_tx, _) = broadcast::channel(100);

        Self {
            storage,
            timers: Mutex::new(timers),
            history: Mutex::new(history),
            persistence_errors: Mutex::new(errors),
            events_tx,
            ticker: Ticker::new(tick_period),
        }
    }

    /// Subscribe to halfway and completion notifications
    pub fn subscribe(&self) -> broadcast::Receiver<TimerEvent> {
        self.events_tx.subscribe()
    }

    /// Validate a draft, append the new paused timer and persist the collection
    pub fn add_timer(&self, draft: TimerDraft) -> Result<Timer, TimerError> {
        let timer = Timer::from_draft(&draft)?;

        let mut timers = self.lock_timers()?;
        timers.push(timer.clone());
        self.persist_timers(&timers);
        drop(timers);

        info!(
            "Added timer '{}' ({}s, {}) with id {}",
            timer.name(),
            timer.duration(),
            timer.category(),
            timer.id()
        );
        Ok(timer)
    }

    /// Start a paused timer. `None` when no timer has this id.
    pub fn start(&self, id: Uuid) -> Result<Option<Timer>, TimerError> {
        self.update_timer(id, "start", Timer::start)
    }

    /// Pause a running timer. `None` when no timer has this id.
    pub fn pause(&self, id: Uuid) -> Result<Option<Timer>, TimerError> {
        self.update_timer(id, "pause", Timer::pause)
    }

    /// Restore the full duration and pause. `None` when no timer has this id.
    pub fn reset(&self, id: Uuid) -> Result<Option<Timer>, TimerError> {
        self.update_timer(id, "reset", |timer| {
            timer.reset();
            true
        })
    }

    /// Advance every running timer by one second.
    ///
    /// Completions are appended to the history in the same pass; each
    /// completion is logged exactly once because a completed timer no longer
    /// runs.
    pub fn tick(&self) -> Result<TickReport, TimerError> {
        let mut report = TickReport::default();
        let now = Utc::now();

        let mut timers = self.lock_timers()?;
        for timer in timers.iter_mut() {
            let Some(outcome) = timer.tick() else {
                continue;
            };
            report.advanced.push(timer.id());

            if outcome.halfway {
                info!("Timer '{}' is halfway done", timer.name());
                report.halfway.push(timer.id());
                self.emit(TimerEvent::Halfway {
                    id: timer.id(),
                    name: timer.name().to_string(),
                    remaining: timer.remaining(),
                });
            }

            if outcome.completed {
                info!("Timer '{}' completed", timer.name());
                report.completed.push(HistoryEntry::completed(timer, now));
            }
        }

        if report.advanced.is_empty() {
            return Ok(report);
        }
        self.persist_timers(&timers);

        if !report.completed.is_empty() {
            let mut history = self.lock_history()?;
            for entry in &report.completed {
                history.append(entry.clone());
            }
            self.persist_history(&history);
        }
        drop(timers);

        for entry in &report.completed {
            self.emit(TimerEvent::Completed {
                entry: entry.clone(),
            });
        }

        Ok(report)
    }

    /// Snapshot of all timers in creation order
    pub fn timers(&self) -> Result<Vec<Timer>, TimerError> {
        Ok(self.lock_timers()?.clone())
    }

    /// Snapshot of one timer
    pub fn timer(&self, id: Uuid) -> Result<Option<Timer>, TimerError> {
        Ok(self.lock_timers()?.iter().find(|t| t.id() == id).cloned())
    }

    /// Snapshot of the timers that have completed
    pub fn completed_timers(&self) -> Result<Vec<Timer>, TimerError> {
        Ok(self
            .lock_timers()?
            .iter()
            .filter(|t| t.is_completed())
            .cloned()
            .collect())
    }

    /// Snapshot of the completion history
    pub fn history(&self) -> Result<Vec<HistoryEntry>, TimerError> {
        Ok(self.lock_history()?.entries().to_vec())
    }

    /// Most recent persistence failures, oldest first
    pub fn persistence_errors(&self) -> Vec<String> {
        self.persistence_errors
            .lock()
            .map(|errors| errors.clone())
            .unwrap_or_default()
    }

    /// Start driving `tick` once per period. Returns false if already running.
    pub fn start_ticker(self: &Arc<Self>) -> bool {
        self.ticker.start(Arc::downgrade(self))
    }

    /// Stop the ticker and wait for its task to finish
    pub async fn stop_ticker(&self) -> bool {
        self.ticker.stop().await
    }

    pub fn ticker_running(&self) -> bool {
        self.ticker.is_running()
    }

    fn update_timer<F>(&self, id: Uuid, action: &str, updater: F) -> Result<Option<Timer>, TimerError>
    where
        F: FnOnce(&mut Timer) -> bool,
    {
        let mut timers = self.lock_timers()?;
        let Some(timer) = timers.iter_mut().find(|t| t.id() == id) else {
            debug!("Ignoring {} for unknown timer {}", action, id);
            return Ok(None);
        };

        let changed = updater(timer);
        let updated = timer.clone();

        if changed {
            self.persist_timers(&timers);
            info!("Timer '{}' {}: now {:?}", updated.name(), action, updated.status());
        } else {
            debug!(
                "Ignoring {} for timer '{}' in status {:?}",
                action,
                updated.name(),
                updated.status()
            );
        }

        Ok(Some(updated))
    }

    fn emit(&self, event: TimerEvent) {
        // No subscribers is fine; alerts are best-effort
        if self.events_tx.send(event).is_err() {
            debug!("No listeners for timer event");
        }
    }

    fn persist_timers(&self, timers: &[Timer]) {
        if let Err(e) = save_json(self.storage.as_ref(), TIMERS_KEY, timers) {
            self.record_error(format!("Failed to save timers: {}", e));
        }
    }

    fn persist_history(&self, history: &HistoryLog) {
        if let Err(e) = history.save(self.storage.as_ref()) {
            self.record_error(format!("Failed to save history: {}", e));
        }
    }

    fn record_error(&self, message: String) {
        error!("{}", message);
        if let Ok(mut errors) = self.persistence_errors.lock() {
            errors.push(message);
            let overflow = errors.len().saturating_sub(MAX_RECORDED_ERRORS);
            errors.drain(..overflow);
        }
    }

    fn lock_timers(&self) -> Result<std::sync::MutexGuard<'_, Vec<Timer>>, TimerError> {
        self.timers.lock().map_err(|_| TimerError::Poisoned("timer"))
    }

    fn lock_history(&self) -> Result<std::sync::MutexGuard<'_, HistoryLog>, TimerError> {
        self.history.lock().map_err(|_| TimerError::Poisoned("history"))
    }
}

/// Copy an unparsable document to `<key>.corrupt` so the next save does not
/// destroy it
fn preserve_corrupt(storage: &dyn KeyValueStore, error: &StorageError, errors: &mut Vec<String>) {
    let StorageError::Corrupt { key, .. } = error else {
        return;
    };
    let backup_key = format!("{}.corrupt", key);

    let result = storage
        .get(key)
        .and_then(|raw| match raw {
            Some(raw) => storage.set(&backup_key, &raw),
            None => Ok(()),
        });

    match result {
        Ok(()) => warn!("Kept unreadable `{}` document as `{}`", key, backup_key),
        Err(e) => {
            error!("Failed to keep unreadable `{}` document: {}", key, e);
            errors.push(format!("Failed to keep unreadable `{}` document: {}", key, e));
        }
    }
}

/// Read persisted timers, dropping records that fail validation
fn load_timers(storage: &dyn KeyValueStore) -> Result<Vec<Timer>, StorageError> {
    let records: Vec<serde_json::Value> = load_json(storage, TIMERS_KEY)?.unwrap_or_default();

    let mut seen = HashSet::new();
    let mut timers = Vec::with_capacity(records.len());
    for (index, record) in records.into_iter().enumerate() {
        match serde_json::from_value::<Timer>(record) {
            Ok(timer) if seen.insert(timer.id()) => timers.push(timer),
            Ok(timer) => warn!("Skipping duplicate stored timer {}", timer.id()),
            Err(e) => warn!("Skipping invalid stored timer #{}: {}", index, e),
        }
    }

    Ok(timers)
}
