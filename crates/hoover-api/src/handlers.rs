//! Route handlers.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::Json;
use serde::{Deserialize, Serialize};
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::{Stream, StreamExt};

use hoover_chat::card::render_activity;
use hoover_core::InboundTurn;

use crate::error::ApiError;
use crate::state::AppState;
use crate::transport::{ChannelTransport, REPLY_BUFFER};

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub backend: String,
    pub vocabulary_terms: u64,
    pub uptime_secs: u64,
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        backend: state.handler.backend_name().to_string(),
        vocabulary_terms: state.handler.vocabulary_size() as u64,
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

/// POST /api/messages - run one turn and return its activities as a JSON
/// array. Typing indicators are dropped since the reply arrives all at once.
pub async fn messages(
    State(state): State<AppState>,
    Json(turn): Json<InboundTurn>,
) -> Result<Json<Vec<serde_json::Value>>, ApiError> {
    state.handler.validate(&turn)?;

    let (transport, mut rx) = ChannelTransport::channel(REPLY_BUFFER);
    let handler = Arc::clone(&state.handler);
    let task = tokio::spawn(async move { handler.handle(&turn, &transport).await });

    let mut activities = Vec::new();
    while let Some(reply) = rx.recv().await {
        if !reply.is_typing() {
            activities.push(render_activity(&reply));
        }
    }

    let outcome = task
        .await
        .map_err(|e| ApiError::Internal(format!("turn task failed: {}", e)))??;
    tracing::debug!(?outcome, activities = activities.len(), "Turn complete");

    Ok(Json(activities))
}

/// POST /api/messages/stream - run one turn, streaming each activity as an
/// SSE `activity` event. Disconnecting cancels the turn.
pub async fn messages_stream(
    State(state): State<AppState>,
    Json(turn): Json<InboundTurn>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>> + Send>, ApiError> {
    state.handler.validate(&turn)?;

    let (transport, rx) = ChannelTransport::channel(REPLY_BUFFER);
    let handler = Arc::clone(&state.handler);
    tokio::spawn(async move {
        if let Err(e) = handler.handle(&turn, &transport).await {
            tracing::warn!(turn = %turn.id, error = %e, "Streamed turn failed");
        }
    });

    let stream = ReceiverStream::new(rx).map(|reply| {
        let data = render_activity(&reply).to_string();
        Ok(Event::default().event("activity").data(data))
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15))))
}
