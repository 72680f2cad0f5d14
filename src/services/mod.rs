//! External collaborators module
//!
//! Writing the history export file and handing it to a share command.

pub mod export;
pub mod share;

// Re-export main functions
pub use export::*;
pub use share::*;
