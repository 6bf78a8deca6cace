//! Timer Panel - A control panel for a WebSocket timer backend
//!
//! This is the main entry point for the timer-panel application.

use std::{sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tracing::info;

use timer_panel::{
    api::create_router, config::Config, state::Session, tasks::connection_task,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("timer_panel={},tower_http=info", config.log_level()))
        .init();

    info!("Starting timer-panel v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: panel={}, backend={}", config.address(), config.backend_uri());

    // Create the session and open the backend connection
    let (session, outbound) = Session::new(config.backend_uri());
    let connection = tokio::spawn(connection_task(Arc::clone(&session), outbound));

    // Create HTTP router with all endpoints
    let app = create_router(Arc::clone(&session));

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Panel running on http://{}", addr);
    info!("Endpoints:");
    info!("  GET  /                  - Control panel");
    info!("  POST /slots/:slot/set    - Arm a slot (form: seconds)");
    info!("  POST /slots/:slot/cancel - Cancel a slot");
    info!("  POST /slots/:slot/reset  - Re-arm a slot (form: seconds)");
    info!("  GET  /events            - Panel state as server-sent events");
    info!("  GET  /status            - Panel state as JSON");
    info!("  GET  /health            - Health check");

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

    session.teardown();
    if tokio::time::timeout(Duration::from_secs(1), connection).await.is_err() {
        tracing::warn!("Backend connection did not close in time");
    }

    info!("Shutdown complete");
    Ok(())
}
