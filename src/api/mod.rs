//! HTTP API server for the polyglot gateway

pub mod health;
pub mod webhooks;

use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::Result;
use crate::pipeline::Pipeline;
use crate::security::WebhookVerifier;

/// Shared state for API handlers
pub struct ApiState {
    pub verifier: WebhookVerifier,
    pub pipeline: Arc<Pipeline>,
}

/// API server
pub struct ApiServer {
    state: Arc<ApiState>,
    port: u16,
}

impl ApiServer {
    /// Create a server for the given state
    #[must_use]
    pub fn new(state: ApiState, port: u16) -> Self {
        Self {
            state: Arc::new(state),
            port,
        }
    }

    /// Build the router with all routes
    ///
    /// Synthesized audio is served from the pipeline's store root under `/static`.
    #[must_use]
    pub fn router(&self) -> Router {
        let static_dir = self.state.pipeline.store().root().to_path_buf();
        tracing::info!(path = %static_dir.display(), "serving static files");

        Router::new()
            .merge(webhooks::router(self.state.clone()))
            .nest_service("/static", ServeDir::new(static_dir))
            .merge(health::router())
            .merge(health::ready_router(self.state.clone()))
            .layer(TraceLayer::new_for_http())
    }

    /// Run the API server
    ///
    /// # Errors
    ///
    /// Returns error if server fails to bind or run
    pub async fn run(self) -> Result<()> {
        let addr = format!("0.0.0.0:{}", self.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| crate::Error::Config(format!("failed to bind API server: {e}")))?;

        tracing::info!(port = self.port, "API server listening");

        axum::serve(listener, self.router())
            .await
            .map_err(|e| crate::Error::Config(format!("API server error: {e}")))?;

        Ok(())
    }
}
