//! Spawns a gateway on an ephemeral port over an in-memory store.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use homegame_gateway::api::build_app;
use homegame_gateway::app_state::AppState;
use homegame_gateway::config::{AccessMode, TrackerConfig};
use homegame_gateway::persistence::MemoryStore;

/// Starts a server and returns its address.
#[allow(clippy::panic)]
pub async fn spawn_server(access_mode: AccessMode, admins: &[&str]) -> SocketAddr {
    let config = TrackerConfig {
        access_mode,
        admin_usernames: admins.iter().map(|a| (*a).to_string()).collect(),
        ..TrackerConfig::default()
    };
    let state = AppState::new(Arc::new(MemoryStore::new()), &config);
    let Ok(()) = state.session_service.load_all().await else {
        panic!("empty store should load");
    };
    let Ok(listener) = tokio::net::TcpListener::bind("127.0.0.1:0").await else {
        panic!("cannot bind test listener");
    };
    let Ok(addr) = listener.local_addr() else {
        panic!("listener has no address");
    };
    tokio::spawn(async move {
        let _ = axum::serve(listener, build_app(state)).await;
    });
    addr
}
