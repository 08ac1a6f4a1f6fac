//! homegame-gateway server entry point.
//!
//! Starts the Axum HTTP server with REST and WebSocket endpoints.

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use homegame_gateway::api;
use homegame_gateway::app_state::AppState;
use homegame_gateway::config::{StorageBackend, TrackerConfig};
use homegame_gateway::persistence::change_feed::ChangeFeed;
use homegame_gateway::persistence::{LocalStore, MemoryStore, PostgresStore, Store};

const TOAST_SWEEP_PERIOD: Duration = Duration::from_millis(500);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = TrackerConfig::from_env()?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if config.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
    tracing::info!(
        addr = %config.listen_addr,
        backend = ?config.storage_backend,
        "starting homegame-gateway"
    );

    // Build persistence layer
    let mut feed = None;
    let store: Arc<dyn Store> = match config.storage_backend {
        StorageBackend::Memory => Arc::new(MemoryStore::new()),
        StorageBackend::Local => Arc::new(LocalStore::new(
            config.data_dir.clone(),
            config.storage_key_suffix.clone(),
        )),
        StorageBackend::Postgres => {
            let store = PostgresStore::connect(&config).await?;
            store.migrate().await?;
            feed = Some(ChangeFeed::subscribe(store.pool(), &config.realtime_channel).await?);
            Arc::new(store)
        }
    };

    // Build service layer and load the persisted session
    let app_state = AppState::new(store, &config);
    app_state.session_service.load_all().await?;

    if let Some(feed) = feed {
        let service = Arc::clone(&app_state.session_service);
        tokio::spawn(feed.run(move |notice| {
            let service = Arc::clone(&service);
            async move {
                if let Err(e) = service.resync(notice.collection).await {
                    tracing::warn!(collection = %notice.collection, error = %e, "resync failed");
                }
            }
        }));
    }
    tokio::spawn(Arc::clone(&app_state.notifier).run_toast_sweeper(TOAST_SWEEP_PERIOD));

    let app = api::build_app(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
