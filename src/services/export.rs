//! History export to a JSON file

use std::path::{Path, PathBuf};
use tracing::info;

use crate::{error::TimerError, state::HistoryEntry};

/// File name of the export, always overwritten
pub const EXPORT_FILE_NAME: &str = "timer_history.json";

/// Export destination and optional share command
#[derive(Debug, Clone)]
pub struct ExportSettings {
    pub dir: PathBuf,
    pub share_command: Option<String>,
}

/// Write every entry as a pretty-printed JSON array to `<dir>/timer_history.json`.
///
/// An empty history is rejected and nothing is written.
pub async fn write_history_file(entries: &[HistoryEntry], dir: &Path) -> Result<PathBuf, TimerError> {
    if entries.is_empty() {
        return Err(TimerError::EmptyHistory);
    }

    let json = serde_json::to_string_pretty(entries)?;
    let path = dir.join(EXPORT_FILE_NAME);

    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|source| TimerError::Export {
            path: dir.to_path_buf(),
            source,
        })?;
    tokio::fs::write(&path, json)
        .await
        .map_err(|source| TimerError::Export {
            path: path.clone(),
            source,
        })?;

    info!("Exported {} history entries to {}", entries.len(), path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Category, Timer};
    use chrono::Utc;
    use tempfile::TempDir;

    fn entries(names: &[&str]) -> Vec<HistoryEntry> {
        names
            .iter()
            .map(|name| {
                let timer = Timer::new(name, 30, Category::Workout, false).unwrap();
                HistoryEntry::completed(&timer, Utc::now())
            })
            .collect()
    }

    #[tokio::test]
    async fn empty_history_is_rejected() {
        let dir = TempDir::new().unwrap();
        let err = write_history_file(&[], dir.path()).await.unwrap_err();

        assert!(matches!(err, TimerError::EmptyHistory));
        assert!(!dir.path().join(EXPORT_FILE_NAME).exists());
    }

    #[tokio::test]
    async fn export_overwrites_with_the_whole_history() {
        let dir = TempDir::new().unwrap();
        write_history_file(&entries(&["Old"]), dir.path()).await.unwrap();

        let current = entries(&["Squats", "Reading"]);
        let path = write_history_file(&current, dir.path()).await.unwrap();

        let parsed: Vec<HistoryEntry> =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(parsed, current);
    }

    #[tokio::test]
    async fn export_creates_missing_directories() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("documents").join("timers");

        let path = write_history_file(&entries(&["Plank"]), &target).await.unwrap();
        assert_eq!(path, target.join(EXPORT_FILE_NAME));
        assert!(path.is_file());
    }
}
