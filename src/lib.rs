//! Timer Keeper - a local countdown timer service
//!
//! This library manages countdown timers that tick once per second, logs every
//! completion to an append-only history and persists both to key-value
//! storage. The history can be exported to a JSON file.

pub mod api;
pub mod config;
pub mod error;
pub mod services;
pub mod state;
pub mod storage;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use config::Config;
pub use error::{StorageError, TimerError, ValidationError};
pub use state::{AppState, TimerStore};
pub use utils::signals::shutdown_signal;
