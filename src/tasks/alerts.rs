//! Alert listener background task

use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use crate::state::{AppState, TimerEvent};

/// Background task surfacing halfway and completion events
pub async fn alert_task(state: Arc<AppState>) {
    info!("Starting alert task");

    let mut events = state.store.subscribe();

    loop {
        match events.recv().await {
            Ok(TimerEvent::Halfway { name, remaining, .. }) => {
                state.record_alert(format!(
                    "Timer {} is halfway done! {}s left",
                    name, remaining
                ));
            }
            Ok(TimerEvent::Completed { entry }) => {
                state.record_alert(entry.to_string());
            }
            Err(RecvError::Lagged(missed)) => {
                warn!("Alert task fell behind, missed {} timer events", missed);
            }
            Err(RecvError::Closed) => {
                info!("Timer events closed, stopping alert task");
                break;
            }
        }
    }
}
