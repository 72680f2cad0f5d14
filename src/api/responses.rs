//! API response structures

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::error;
use uuid::Uuid;

use crate::{
    error::TimerError,
    state::{ExportReport, HistoryEntry, Timer},
};

/// Message envelope used for notices and errors
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl ApiResponse {
    pub fn new(status: String, message: String) -> Self {
        Self {
            status,
            message,
            timestamp: Utc::now(),
        }
    }

    pub fn error(message: String) -> Self {
        Self::new("error".to_string(), message)
    }
}

/// A timer together with its remaining fraction for progress display
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerView {
    #[serde(flatten)]
    pub timer: Timer,
    pub progress: f64,
}

impl From<Timer> for TimerView {
    fn from(timer: Timer) -> Self {
        Self {
            progress: timer.progress(),
            timer,
        }
    }
}

/// Response for endpoints acting on one timer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub timer: TimerView,
}

impl TimerResponse {
    pub fn ok(message: String, timer: Timer) -> Self {
        Self {
            status: "ok".to_string(),
            message,
            timestamp: Utc::now(),
            timer: timer.into(),
        }
    }
}

/// Response listing timers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimersResponse {
    pub count: usize,
    pub timers: Vec<TimerView>,
}

impl From<Vec<Timer>> for TimersResponse {
    fn from(timers: Vec<Timer>) -> Self {
        Self {
            count: timers.len(),
            timers: timers.into_iter().map(TimerView::from).collect(),
        }
    }
}

/// One history entry with its log line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryItem {
    #[serde(flatten)]
    pub entry: HistoryEntry,
    pub line: String,
}

/// Response listing the completion history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub count: usize,
    pub entries: Vec<HistoryItem>,
}

impl From<Vec<HistoryEntry>> for HistoryResponse {
    fn from(entries: Vec<HistoryEntry>) -> Self {
        Self {
            count: entries.len(),
            entries: entries
                .into_iter()
                .map(|entry| HistoryItem {
                    line: entry.to_string(),
                    entry,
                })
                .collect(),
        }
    }
}

/// Response for a successful export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub report: ExportReport,
}

/// Status response with store and server information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub timers: usize,
    pub running: usize,
    pub completed: usize,
    pub history_entries: usize,
    pub ticker_running: bool,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
    pub last_alert: Option<String>,
    pub errors: Vec<String>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Error returned by handlers, rendered as an [`ApiResponse`]
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn timer_not_found(id: Uuid) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: format!("No timer with id {}", id),
        }
    }
}

impl From<TimerError> for ApiError {
    fn from(e: TimerError) -> Self {
        if e.is_user_facing() {
            return Self {
                status: StatusCode::BAD_REQUEST,
                message: e.to_string(),
            };
        }

        // Internal details go to the log, the client gets a generic notice
        error!("Request failed: {}", e);
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "Something went wrong, please try again".to_string(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ApiResponse::error(self.message))).into_response()
    }
}
