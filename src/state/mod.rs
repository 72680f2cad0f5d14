//! State management module
//!
//! Timer records, the completion history, the store that owns both and the
//! application state shared with the HTTP handlers.

pub mod app_state;
pub mod history;
pub mod store;
pub mod timer;

// Re-export main types
pub use app_state::{AppState, ExportReport};
pub use history::{HistoryEntry, HistoryLog};
pub use store::{TickReport, TimerEvent, TimerStore};
pub use timer::{Category, DurationInput, TickOutcome, Timer, TimerDraft, TimerStatus};
