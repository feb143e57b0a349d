//! Webhook endpoints for channel integrations

use std::sync::Arc;

use axum::{Router, routing::post};

use super::ApiState;

pub mod line;

/// Build webhooks router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/callback", post(line::handle_callback))
        .with_state(state)
}
