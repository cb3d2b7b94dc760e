//! Web server for the Stratus messages API.

pub mod middleware;
pub mod reaper;
pub mod shutdown;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use stratus_core::{SharedConfig, StratusConfig};
use stratus_messages::MessageApi;
use stratus_storage::{MemoryMessageStore, MessageStore, RedbMessageStore};
use tower_http::trace::TraceLayer;

pub use middleware::{api_version_middleware, request_id_middleware};

/// Server state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub api: Arc<MessageApi>,
    pub config: SharedConfig,
}

impl AppState {
    pub fn new(api: Arc<MessageApi>, config: SharedConfig) -> Self {
        Self { api, config }
    }

    /// Build state over `store` with the default clock.
    pub fn with_store(store: Arc<dyn MessageStore>, config: SharedConfig) -> Self {
        let api = Arc::new(MessageApi::new(store, config.clone()));
        Self::new(api, config)
    }
}

/// Create the application router with a specific state.
pub fn create_router(state: AppState) -> Router {
    crate::handlers::messages_router()
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Open the configured message store: redb under `data_dir`, else memory.
pub fn open_store(config: &StratusConfig) -> anyhow::Result<Arc<dyn MessageStore>> {
    match &config.data_dir {
        Some(dir) => {
            tracing::info!("Using persistent message store at {}", dir.display());
            Ok(Arc::new(RedbMessageStore::open(dir)?))
        }
        None => {
            tracing::warn!("No data_dir configured, messages are kept in memory only");
            Ok(Arc::new(MemoryMessageStore::new()))
        }
    }
}

/// Start the web server on a specific address.
pub async fn run(bind: SocketAddr, config: StratusConfig) -> anyhow::Result<()> {
    let store = open_store(&config)?;
    let reap_interval = config.message_reap_interval;
    let state = AppState::with_store(store, config.shared());

    let reaper = reaper::spawn(state.api.clone(), reap_interval);

    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(bind).await?;
    tracing::info!("Stratus API listening on {}", bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown::shutdown_signal())
        .await?;

    if let Some(handle) = reaper {
        handle.abort();
    }
    tracing::info!("Server shutdown complete");
    Ok(())
}
