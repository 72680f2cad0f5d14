//! Configuration and CLI argument handling

use std::{path::PathBuf, time::Duration};
use clap::Parser;
use directories::ProjectDirs;

/// Fallback data directory when the platform has no local data dir
const FALLBACK_DATA_DIR: &str = "timer-keeper-data";

/// CLI argument parsing structure
#[derive(Debug, Parser)]
#[command(name = "timer-keeper")]
#[command(about = "A local countdown timer service with an exportable completion history")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20560")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Directory holding the persisted timers and history
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Directory the history export is written to (defaults to the data directory)
    #[arg(long)]
    pub export_dir: Option<PathBuf>,

    /// Command run with the exported file path as its last argument
    #[arg(long)]
    pub share_command: Option<String>,

    /// Tick period in milliseconds
    #[arg(long, default_value = "1000", value_parser = clap::value_parser!(u64).range(1..))]
    pub tick_ms: u64,

    /// Keep all state in memory instead of on disk
    #[arg(long)]
    pub ephemeral: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    /// Data directory: the flag, else the platform local data dir
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| {
            ProjectDirs::from("", "", "timer-keeper")
                .map(|dirs| dirs.data_local_dir().to_path_buf())
                .unwrap_or_else(|| PathBuf::from(FALLBACK_DATA_DIR))
        })
    }

    pub fn export_dir(&self) -> PathBuf {
        self.export_dir.clone().unwrap_or_else(|| self.data_dir())
    }
}
