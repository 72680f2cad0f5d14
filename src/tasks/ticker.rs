//! Periodic tick scheduler for the timer store

use std::{
    sync::{Mutex, PoisonError, Weak},
    time::Duration,
};
use tokio::{
    sync::oneshot,
    task::JoinHandle,
    time::{interval_at, Instant, MissedTickBehavior},
};
use tracing::{debug, error, info, warn};

use crate::state::TimerStore;

struct RunningTicker {
    shutdown_tx: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

/// Owns at most one background task calling [`TimerStore::tick`] every period
pub struct Ticker {
    period: Duration,
    running: Mutex<Option<RunningTicker>>,
}

impl Ticker {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            running: Mutex::new(None),
        }
    }

    /// Spawn the tick task. Returns false if a live task already exists.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self, store: Weak<TimerStore>) -> bool {
        let mut running = self.running.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(active) = running.as_ref() {
            if !active.handle.is_finished() {
                debug!("Ticker already running, not starting another");
                return false;
            }
        }

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let handle = tokio::spawn(tick_loop(store, self.period, shutdown_rx));
        *running = Some(RunningTicker {
            shutdown_tx,
            handle,
        });

        info!("Ticker started with a period of {:?}", self.period);
        true
    }

    /// Stop the tick task and wait until it has exited.
    ///
    /// No tick runs after this returns. Returns false if nothing was running.
    pub async fn stop(&self) -> bool {
        let active = self
            .running
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let Some(active) = active else {
            return false;
        };

        // The task may already be gone if the store was dropped
        let _ = active.shutdown_tx.send(());
        if let Err(e) = active.handle.await {
            warn!("Ticker task ended abnormally: {}", e);
        }

        info!("Ticker stopped");
        true
    }

    pub fn is_running(&self) -> bool {
        self.running
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|active| !active.handle.is_finished())
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        let running = self.running.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(active) = running.take() {
            active.handle.abort();
        }
    }
}

async fn tick_loop(store: Weak<TimerStore>, period: Duration, mut shutdown_rx: oneshot::Receiver<()>) {
    let mut interval = interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;

            _ = &mut shutdown_rx => {
                debug!("Ticker received shutdown");
                break;
            }

            _ = interval.tick() => {
                let Some(store) = store.upgrade() else {
                    debug!("Timer store dropped, ticker exiting");
                    break;
                };

                match store.tick() {
                    Ok(report) if !report.advanced.is_empty() => {
                        debug!(
                            "Tick advanced {} timers, {} completed",
                            report.advanced.len(),
                            report.completed.len()
                        );
                    }
                    Ok(_) => {}
                    Err(e) => error!("Tick failed: {}", e),
                }
            }
        }
    }
}
