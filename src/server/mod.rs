// HTTP daemon for the statement backend

mod handlers;
mod stores;

pub use handlers::{create_router, health_check, AppState};
pub use stores::{CredentialStore, DefaultStores, StyleStore};

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::edit::EditEngine;

/// The statement API server.
pub struct ApiServer {
    state: Arc<AppState>,
    bind_address: String,
}

impl ApiServer {
    /// Server backed by the built-in stores: fallback keys only, default
    /// style for every user.
    pub fn new(config: Config) -> Self {
        let stores = Arc::new(DefaultStores);
        Self::with_stores(config, stores.clone(), stores)
    }

    /// Server wired to external credential and style stores.
    pub fn with_stores(
        config: Config,
        credentials: Arc<dyn CredentialStore>,
        styles: Arc<dyn StyleStore>,
    ) -> Self {
        let bind_address = config.server.bind_address.clone();
        Self {
            state: Arc::new(AppState {
                config,
                credentials,
                styles,
                edit_engine: EditEngine::new(),
            }),
            bind_address,
        }
    }

    /// Start the HTTP server and run until shutdown.
    pub async fn serve(self) -> Result<()> {
        let addr: SocketAddr = self.bind_address.parse()?;

        // Body size limit guards against oversized payloads; 4MB is generous
        // for accomplishment text.
        let app = create_router(self.state)
            .layer(axum::extract::DefaultBodyLimit::max(4 * 1024 * 1024)) // 4MB
            .layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http());

        tracing::info!("Starting statement API server on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}
