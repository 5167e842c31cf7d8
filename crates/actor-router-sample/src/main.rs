//! # Actor Router Sample
//!
//! A game-server style host demonstrating the opcode router end to end.
//!
//! ## Core Components
//!
//! - **[session_actor]**: login/logout/heartbeat, gated on the player's session state.
//! - **[chat_actor]**: bounded chat history, online players only.
//! - **[lifecycle]**: the [`GameServer`] orchestrator that wires both through the dispatcher.
//!
//! ## Quick Start
//!
//! ```bash
//! RUST_LOG=info cargo run -p actor-router-sample
//! RUST_LOG=debug cargo run -p actor-router-sample -- router.toml
//! ACTOR_ROUTER_POLL_INTERVAL_MS=5 cargo run -p actor-router-sample
//! ```
//!
//! The optional argument is a configuration file; `ACTOR_ROUTER_*` variables override it.

use actor_router::tracing::setup_tracing;
use actor_router::DispatcherConfig;
use actor_router_sample::lifecycle::GameServer;
use std::path::PathBuf;
use tracing::{info, Instrument};

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();

    let path = std::env::args().nth(1).map(PathBuf::from);
    let config = DispatcherConfig::load(path.as_deref()).map_err(|e| e.to_string())?;
    info!(?config, "Starting game server");

    let server = GameServer::start(config)
        .await
        .map_err(|e| e.to_string())?;

    let span = tracing::info_span!("session");
    async {
        // a guest cannot chat yet
        server.say("alice", "anyone here?");
        server.login("alice");
        server.login("bob");
        server.settle().await;

        server.say("alice", "  hello bob  ");
        server.say("bob", "hi alice");
        server.heartbeat("alice");
        // bob is online, a second login is refused at enqueue
        server.login("bob");
        server.settle().await;

        server.logout("bob");
        server.settle().await;
    }
    .instrument(span)
    .await;

    for line in server.history() {
        info!(user = %line.user, text = %line.text, "History");
    }
    info!(online = ?server.online(), "Players still online");

    server.shutdown().await;
    info!("Application completed successfully");
    Ok(())
}
