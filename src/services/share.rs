//! Hand an exported file to an external share command

use std::path::Path;
use tokio::process::Command;
use tracing::{debug, info};

use crate::error::TimerError;

/// Run `command` with the file path appended as its last argument.
///
/// The command line is split on whitespace; no shell is involved.
pub async fn share_file(command: &str, path: &Path) -> Result<(), TimerError> {
    let mut parts = command.split_whitespace();
    let Some(program) = parts.next() else {
        return Err(TimerError::Share("share command is empty".to_string()));
    };

    debug!("Sharing {} with {}", path.display(), command);

    let output = Command::new(program)
        .args(parts)
        .arg(path)
        .output()
        .await
        .map_err(|e| TimerError::Share(format!("Failed to execute {}: {}", program, e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(TimerError::Share(format!(
            "{} exited with {}: {}",
            program,
            output.status,
            stderr.trim()
        )));
    }

    info!("Shared {} via {}", path.display(), program);
    Ok(())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn successful_command_shares() {
        share_file("true", Path::new("/tmp/timer_history.json"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn failing_or_missing_commands_are_errors() {
        let path = Path::new("/tmp/timer_history.json");
        assert!(matches!(share_file("false", path).await, Err(TimerError::Share(_))));
        assert!(matches!(
            share_file("definitely-not-a-share-tool", path).await,
            Err(TimerError::Share(_))
        ));
        assert!(matches!(share_file("   ", path).await, Err(TimerError::Share(_))));
    }
}
