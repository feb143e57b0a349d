//! LINE webhook handler

pub mod types;

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};

use crate::Result;
use crate::api::ApiState;
use crate::pipeline::Pipeline;
use crate::security::SIGNATURE_HEADER;

pub use types::{MessageContent, MessageEvent, WebhookEvent, WebhookPayload};

/// Handle a LINE webhook delivery
///
/// The body is verified against the channel secret before it is parsed. Events
/// are handled in order; a failing event does not stop the ones after it, but
/// the delivery is answered with 500 so the failure is visible upstream.
pub async fn handle_callback(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, &'static str) {
    tracing::info!(body = %String::from_utf8_lossy(&body), "LINE webhook received");

    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());
    if let Err(e) = state.verifier.verify(&body, signature) {
        tracing::warn!(error = %e, "rejecting LINE webhook");
        return (StatusCode::BAD_REQUEST, "Bad Request");
    }

    let payload: WebhookPayload = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::warn!(error = %e, "malformed LINE webhook body");
            return (StatusCode::BAD_REQUEST, "Bad Request");
        }
    };

    let mut failed = 0usize;
    for event in &payload.events {
        if let Err(e) = dispatch(&state.pipeline, event).await {
            tracing::error!(error = %e, "LINE event handling failed");
            failed += 1;
        }
    }

    if failed > 0 {
        tracing::warn!(failed, total = payload.events.len(), "LINE webhook had failures");
        return (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error");
    }

    (StatusCode::OK, "OK")
}

/// Route one event to the pipeline
async fn dispatch(pipeline: &Pipeline, event: &WebhookEvent) -> Result<()> {
    let WebhookEvent::Message(event) = event else {
        tracing::debug!("ignoring non-message event");
        return Ok(());
    };

    if event
        .delivery_context
        .as_ref()
        .is_some_and(|ctx| ctx.is_redelivery)
    {
        tracing::info!(event_id = ?event.webhook_event_id, "handling redelivered event");
    }

    let Some(reply_token) = event.reply_token.as_deref() else {
        tracing::warn!(mode = ?event.mode, "message event without reply token, skipping");
        return Ok(());
    };

    match &event.message {
        MessageContent::Text(message) => pipeline.handle_text(reply_token, &message.text).await,
        MessageContent::Audio(message) => {
            tracing::info!(message_id = %message.id, duration_ms = ?message.duration, "voice message");
            pipeline.handle_audio(&message.id, reply_token).await.map(|_| ())
        }
        MessageContent::Unsupported => {
            tracing::debug!("ignoring unsupported message type");
            Ok(())
        }
    }
}
