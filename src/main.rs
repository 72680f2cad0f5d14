//! Timer Keeper - a local countdown timer service
//!
//! This is the main entry point for the timer-keeper application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use timer_keeper::{
    api::create_router,
    config::Config,
    services::ExportSettings,
    state::{AppState, TimerStore},
    storage::{FileStore, KeyValueStore, MemoryStore},
    tasks::alert_task,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("timer_keeper={},tower_http=info", config.log_level()))
        .init();

    info!("Starting timer-keeper v{}", env!("CARGO_PKG_VERSION"));

    let storage: Arc<dyn KeyValueStore> = if config.ephemeral {
        info!("Ephemeral mode, state is kept in memory only");
        Arc::new(MemoryStore::new())
    } else {
        let store = FileStore::open(config.data_dir())?;
        info!("Storing timers and history in {}", store.dir().display());
        Arc::new(store)
    };

    let export = ExportSettings {
        dir: config.export_dir(),
        share_command: config.share_command.clone(),
    };
    info!(
        "Configuration: host={}, port={}, tick={}ms, export_dir={}",
        config.host,
        config.port,
        config.tick_ms,
        export.dir.display()
    );

    // Load persisted state and build the application state around it
    let store = Arc::new(TimerStore::open(storage, config.tick_period()));
    let state = Arc::new(AppState::new(
        Arc::clone(&store),
        config.host.clone(),
        config.port,
        export,
    ));

    // Surface halfway and completion alerts
    let alert_state = Arc::clone(&state);
    tokio::spawn(async move {
        alert_task(alert_state).await;
    });

    store.start_ticker();

    // Create HTTP router with all endpoints
    let app = create_router(state);

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  GET  /timers             - List timers");
    info!("  POST /timers             - Add a timer");
    info!("  GET  /timers/completed   - List completed timers");
    info!("  POST /timers/:id/start   - Start a timer");
    info!("  POST /timers/:id/pause   - Pause a timer");
    info!("  POST /timers/:id/reset   - Reset a timer");
    info!("  GET  /history            - Completion history");
    info!("  POST /history/export     - Export history to a file");
    info!("  GET  /status             - Store and server status");
    info!("  GET  /health             - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    store.stop_ticker().await;

    info!("Server shutdown complete");
    Ok(())
}
