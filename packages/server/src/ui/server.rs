//! Server execution logic.

use std::sync::Arc;

use axum::{Router, routing::get};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::domain::EventPusher;
use crate::usecase::{
    DisconnectUseCase, GetPresenceUseCase, JoinTeamUseCase, LeaveTeamUseCase,
    RelayBoardEventUseCase,
};

use super::{
    handler::{
        http::{get_team_presence, get_teams, health_check},
        websocket::websocket_handler,
    },
    signal::shutdown_signal,
    state::AppState,
};

/// Real-time board sync server.
///
/// # Example
///
/// ```ignore
/// let server = Server::new(pusher, join, leave, relay, disconnect, presence);
/// server.run("127.0.0.1".to_string(), 5000).await?;
/// ```
pub struct Server {
    pusher: Arc<dyn EventPusher>,
    join_team_usecase: Arc<JoinTeamUseCase>,
    leave_team_usecase: Arc<LeaveTeamUseCase>,
    relay_event_usecase: Arc<RelayBoardEventUseCase>,
    disconnect_usecase: Arc<DisconnectUseCase>,
    presence_usecase: Arc<GetPresenceUseCase>,
}

impl Server {
    pub fn new(
        pusher: Arc<dyn EventPusher>,
        join_team_usecase: Arc<JoinTeamUseCase>,
        leave_team_usecase: Arc<LeaveTeamUseCase>,
        relay_event_usecase: Arc<RelayBoardEventUseCase>,
        disconnect_usecase: Arc<DisconnectUseCase>,
        presence_usecase: Arc<GetPresenceUseCase>,
    ) -> Self {
        Self {
            pusher,
            join_team_usecase,
            leave_team_usecase,
            relay_event_usecase,
            disconnect_usecase,
            presence_usecase,
        }
    }

    /// Assemble the axum router.
    ///
    /// Public so integration tests can serve the router on an OS-assigned
    /// port without going through `run`.
    pub fn into_router(self) -> Router {
        let app_state = Arc::new(AppState {
            pusher: self.pusher,
            join_team_usecase: self.join_team_usecase,
            leave_team_usecase: self.leave_team_usecase,
            relay_event_usecase: self.relay_event_usecase,
            disconnect_usecase: self.disconnect_usecase,
            presence_usecase: self.presence_usecase,
        });

        Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/api/teams", get(get_teams))
            .route("/api/teams/{team_id}/presence", get(get_team_presence))
            // The sync server fronts a browser SPA served from another origin
            .layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http())
            .with_state(app_state)
    }

    /// Run the board sync server.
    ///
    /// # Arguments
    ///
    /// * `host` - The host address to bind to (e.g., "127.0.0.1")
    /// * `port` - The port number to bind to (e.g., 5000)
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address
    /// or if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let app = self.into_router();

        let bind_addr = format!("{}:{}", host, port);
        let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

        tracing::info!(
            "Board sync server listening on {}",
            listener.local_addr()?
        );
        tracing::info!("Connect to: ws://{}/ws", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}
