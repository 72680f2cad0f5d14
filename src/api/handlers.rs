//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::Json,
};
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::state::{AppState, Timer, TimerDraft};
use super::responses::{
    ApiError, ExportResponse, HealthResponse, HistoryResponse, StatusResponse, TimerResponse,
    TimersResponse,
};

/// Handle GET /timers - List all timers
pub async fn list_timers_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<TimersResponse>, ApiError> {
    Ok(Json(state.store.timers()?.into()))
}

/// Handle POST /timers - Create a paused timer
pub async fn add_timer_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<TimerDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<TimerResponse>), ApiError> {
    let Json(draft) = payload?;
    let timer = state.add_timer(draft)?;
    Ok((
        StatusCode::CREATED,
        Json(TimerResponse::ok(format!("Timer {} added", timer.name()), timer)),
    ))
}

/// Handle GET /timers/completed - Snapshot of completed timers
pub async fn completed_timers_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<TimersResponse>, ApiError> {
    Ok(Json(state.store.completed_timers()?.into()))
}

/// Handle POST /timers/:id/start - Start a paused timer
pub async fn start_timer_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<TimerResponse>, ApiError> {
    let timer = state.start_timer(id)?;
    timer_reply(id, timer, "started")
}

/// Handle POST /timers/:id/pause - Pause a running timer
pub async fn pause_timer_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<TimerResponse>, ApiError> {
    let timer = state.pause_timer(id)?;
    timer_reply(id, timer, "paused")
}

/// Handle POST /timers/:id/reset - Restore a timer's full duration
pub async fn reset_timer_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<TimerResponse>, ApiError> {
    let timer = state.reset_timer(id)?;
    timer_reply(id, timer, "reset")
}

/// Handle GET /history - Completion history with display lines
pub async fn history_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<HistoryResponse>, ApiError> {
    Ok(Json(state.store.history()?.into()))
}

/// Handle POST /history/export - Write the history file and share it
pub async fn export_history_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ExportResponse>, ApiError> {
    let report = state.export_history().await?;
    info!("History exported to {}", report.path.display());

    Ok(Json(ExportResponse {
        status: "ok".to_string(),
        message: format!("Exported {} history entries", report.entries),
        timestamp: Utc::now(),
        report,
    }))
}

/// Handle GET /status - Return current store and server status
pub async fn status_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StatusResponse>, ApiError> {
    let timers = state.store.timers()?;
    let history_entries = state.store.history()?.len();
    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        timers: timers.len(),
        running: timers.iter().filter(|t| t.is_running()).count(),
        completed: timers.iter().filter(|t| t.is_completed()).count(),
        history_entries,
        ticker_running: state.store.ticker_running(),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
        last_alert: state.last_alert(),
        errors: state.store.persistence_errors(),
    }))
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}

fn timer_reply(id: Uuid, timer: Option<Timer>, verb: &str) -> Result<Json<TimerResponse>, ApiError> {
    let timer = timer.ok_or_else(|| ApiError::timer_not_found(id))?;
    Ok(Json(TimerResponse::ok(
        format!("Timer {} {}", timer.name(), verb),
        timer,
    )))
}
