//! Real-time Kanban board synchronization server.
//!
//! Relays board events between clients editing the same team board and
//! tracks who is present in each team room.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin bansou-server
//! cargo run --bin bansou-server -- --host 0.0.0.0 --port 5000
//! ```

use std::sync::Arc;

use bansou_server::{
    infrastructure::{event_pusher::WebSocketEventPusher, registry::InMemoryPresenceRegistry},
    ui::Server,
    usecase::{
        DisconnectUseCase, GetPresenceUseCase, JoinTeamUseCase, LeaveTeamUseCase,
        RelayBoardEventUseCase,
    },
};
use bansou_shared::logger::setup_logger;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "bansou-server")]
#[command(about = "Real-time Kanban board synchronization server", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "5000")]
    port: u16,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    let args = Args::parse();

    // Initialize dependencies in order:
    // 1. PresenceRegistry
    // 2. EventPusher
    // 3. UseCases
    // 4. Server

    let registry = Arc::new(InMemoryPresenceRegistry::new());
    let pusher = Arc::new(WebSocketEventPusher::new());

    let join_team_usecase = Arc::new(JoinTeamUseCase::new(registry.clone(), pusher.clone()));
    let leave_team_usecase = Arc::new(LeaveTeamUseCase::new(registry.clone(), pusher.clone()));
    let relay_event_usecase =
        Arc::new(RelayBoardEventUseCase::new(registry.clone(), pusher.clone()));
    let disconnect_usecase = Arc::new(DisconnectUseCase::new(registry.clone(), pusher.clone()));
    let presence_usecase = Arc::new(GetPresenceUseCase::new(registry.clone()));

    let server = Server::new(
        pusher,
        join_team_usecase,
        leave_team_usecase,
        relay_event_usecase,
        disconnect_usecase,
        presence_usecase,
    );
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
