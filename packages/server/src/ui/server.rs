//! Server execution logic.

use std::{future::Future, sync::Arc, time::Duration};

use axum::{
    Router,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::usecase::{LivenessSupervisor, RoomCoordinator};

use super::{
    handler::{
        get_presence, get_room_members, health_check, post_room_notice, websocket_handler,
    },
    signal::shutdown_signal,
    state::AppState,
};

/// Server settings collected from the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// The host address to bind to (e.g., "127.0.0.1")
    pub host: String,
    /// The port number to bind to (e.g., 3001)
    pub port: u16,
    /// Interval between heartbeat sweeps
    pub heartbeat_interval: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3001,
            heartbeat_interval: Duration::from_secs(30),
        }
    }
}

/// Build the HTTP/WebSocket router.
pub fn router(coordinator: Arc<RoomCoordinator>) -> Router {
    let app_state = Arc::new(AppState { coordinator });

    Router::new()
        // WebSocket エンドポイント
        .route("/ws", get(websocket_handler))
        // HTTP エンドポイント
        .route("/api/health", get(health_check))
        .route("/api/presence", get(get_presence))
        .route("/api/rooms/{room_id}/members", get(get_room_members))
        .route("/api/rooms/{room_id}/notices", post(post_room_notice))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

/// Realtime chat server
///
/// # Example
///
/// ```ignore
/// let coordinator = Arc::new(RoomCoordinator::new(hub, store));
/// Server::new(coordinator, ServerConfig::default()).run().await?;
/// ```
pub struct Server {
    coordinator: Arc<RoomCoordinator>,
    config: ServerConfig,
}

impl Server {
    pub fn new(coordinator: Arc<RoomCoordinator>, config: ServerConfig) -> Self {
        Self {
            coordinator,
            config,
        }
    }

    /// Bind to the configured address and serve until Ctrl+C / SIGTERM.
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the configured address or
    /// if there's an error during server execution.
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        let bind_addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = TcpListener::bind(&bind_addr).await?;

        tracing::info!("Connect to: ws://{}/ws", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        self.serve(listener, shutdown_signal()).await?;
        Ok(())
    }

    /// Serve on an already bound listener until `shutdown` resolves.
    ///
    /// The liveness supervisor runs for as long as the server does.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        tracing::info!("Chat server listening on {}", listener.local_addr()?);

        let supervisor =
            LivenessSupervisor::new(self.coordinator.clone(), self.config.heartbeat_interval)
                .spawn();
        let app = router(self.coordinator);

        let result = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await;

        supervisor.abort();
        tracing::info!("Server shutdown complete");
        result
    }
}
