//! Interactive sync client for the bansou board sync server.
//!
//! Connects to the sync server, joins a team room and relays board events
//! both ways. With `--api-url` set, inbound update signals trigger a
//! re-fetch of the authoritative board from the REST API.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin bansou-client -- --team team-42 --user-id u1 --user-name Uday
//! cargo run --bin bansou-client -- -t team-42 -i u1 -n Uday --api-url http://127.0.0.1:4000
//! ```

use clap::Parser;

use bansou_client::runner::{ClientOptions, run_client};
use bansou_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "bansou-client")]
#[command(about = "Interactive client for the bansou board sync server", long_about = None)]
struct Args {
    /// WebSocket URL of the sync server
    #[arg(short = 'u', long, default_value = "ws://127.0.0.1:5000/ws")]
    url: String,

    /// Base URL of the REST API for board re-fetches
    #[arg(long)]
    api_url: Option<String>,

    /// Team (board) to join
    #[arg(short = 't', long)]
    team: String,

    /// User id to present to the room
    #[arg(short = 'i', long)]
    user_id: String,

    /// Display name to present to the room
    #[arg(short = 'n', long)]
    user_name: String,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();

    let options = ClientOptions {
        url: args.url,
        api_url: args.api_url,
        team_id: args.team,
        user_id: args.user_id,
        user_name: args.user_name,
    };

    if let Err(e) = run_client(options).await {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}
