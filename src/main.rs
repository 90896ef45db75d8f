//! Counter Timers - A list of independent countdown timers
//! 
//! This is the main entry point for the counter-timers application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use counter_timers::{
    api::create_router,
    config::Config,
    state::{AppState, SuspensionStore},
    tasks::{tick_dispatcher_task, wake_recovery_task},
    utils::{shutdown_signal, SystemClock},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("counter_timers={},tower_http=info", config.log_level()))
        .init();

    info!("Starting counter-timers server v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, state_file={:?}",
          config.host, config.port, config.state_file);

    let store = match &config.state_file {
        Some(path) => SuspensionStore::open(path)?,
        None => SuspensionStore::in_memory(),
    };

    // Create application state
    let (state, tick_rx) = AppState::new(
        config.port,
        config.host.clone(),
        Arc::new(SystemClock),
        store,
    );
    let state = Arc::new(state);

    // Deliver ticks from every timer's tick source
    tokio::spawn(tick_dispatcher_task(Arc::clone(&state), tick_rx));

    // Reconcile ticking timers after the machine sleeps
    tokio::spawn(wake_recovery_task(
        Arc::clone(&state),
        config.wake_check_interval(),
        config.sleep_threshold(),
    ));

    // Create HTTP router with all endpoints
    let app = create_router(state);

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  GET    /timers                - List timers");
    info!("  POST   /timers                - Add a timer {{hours, minutes, seconds}}");
    info!("  GET    /timers/:id            - Show one timer");
    info!("  DELETE /timers/:id            - Remove a timer");
    info!("  POST   /timers/:id/toggle     - Row button (start/pause/resume/restart)");
    info!("  POST   /timers/:id/detach     - Row scrolled out of view");
    info!("  POST   /timers/:id/attach     - Row shown again {{width, height}}");
    info!("  POST   /app/background        - App lost focus");
    info!("  POST   /app/foreground        - App active again");
    info!("  GET    /events                - Timer update stream");
    info!("  GET    /status                - Timers and server status");
    info!("  GET    /health                - Health check");

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

    info!("Server shutdown complete");
    Ok(())
}
