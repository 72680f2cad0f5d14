//! Background tasks module
//!
//! This module contains the tick scheduler and the alert listener that run
//! alongside the HTTP server.

pub mod alerts;
pub mod ticker;

// Re-export main items
pub use alerts::alert_task;
pub use ticker::Ticker;
