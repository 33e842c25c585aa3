//! Push channel lifecycle webhooks, invoked by the platform gateway.
//!
//! The gateway terminates the client WebSockets and notifies this
//! service when a channel opens, closes, or receives a client frame.
//! Each invocation is stateless; the connection registry carries all
//! state between them.

use axum::{
    extract::{RawQuery, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use mediqueue_shared::ConnectionRecord;

use crate::middleware::bearer::{derive_scope, extract_bearer_token, validate_access_token};
use crate::state::AppState;

/// Gateway notification carrying the id of the affected channel.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LifecycleRequest {
    pub connection_id: String,
}

/// A frame a connected client sent on an open channel.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameRequest {
    pub connection_id: String,
    #[serde(default)]
    pub body: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FrameAck {
    pub acknowledged: bool,
}

/// Handshake: authenticate the caller, derive its routing scope, and
/// register the connection. A non-2xx response tells the gateway not to
/// open the channel.
pub async fn connect(
    State(state): State<AppState>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
    Json(payload): Json<LifecycleRequest>,
) -> Result<StatusCode, (StatusCode, String)> {
    let token = extract_bearer_token(&headers, query.as_deref()).ok_or_else(|| {
        tracing::info!(
            "Handshake without credential rejected ({})",
            payload.connection_id
        );
        (StatusCode::UNAUTHORIZED, "Missing bearer token".to_string())
    })?;

    let claims = validate_access_token(&token, &state.config.auth_secret).map_err(|e| {
        tracing::info!("Handshake auth failed ({}): {}", payload.connection_id, e);
        (StatusCode::UNAUTHORIZED, format!("Unauthorized: {e}"))
    })?;

    let scope = derive_scope(&claims).map_err(|e| {
        tracing::info!("Handshake rejected for {}: {}", claims.sub, e);
        (StatusCode::FORBIDDEN, e)
    })?;

    let now = Utc::now();
    let record = ConnectionRecord {
        connection_id: payload.connection_id.clone(),
        established_at: now,
        scope,
        expires_at: Some(now + state.config.connection_ttl),
    };

    state.store.put(record).await.map_err(|e| {
        tracing::error!(
            "Failed to register connection {}: {}",
            payload.connection_id,
            e
        );
        (StatusCode::INTERNAL_SERVER_ERROR, format!("Store error: {e}"))
    })?;

    tracing::info!(
        "Push channel open for {} ({})",
        claims.sub,
        payload.connection_id
    );
    Ok(StatusCode::OK)
}

/// Teardown notification. Idempotent, and always OK from the gateway's
/// perspective: a store failure is logged, never allowed to block the
/// teardown.
pub async fn disconnect(
    State(state): State<AppState>,
    Json(payload): Json<LifecycleRequest>,
) -> StatusCode {
    match state.store.delete(&payload.connection_id).await {
        Ok(()) => tracing::info!("Push channel closed ({})", payload.connection_id),
        Err(e) => tracing::error!(
            "Failed to remove connection {}: {}",
            payload.connection_id,
            e
        ),
    }
    StatusCode::OK
}

/// Inbound client frame (keepalive ping today). Acknowledged so the
/// channel does not look idle to intermediaries; mutates no state.
/// Extension point for client-initiated subscription changes.
pub async fn frame(Json(payload): Json<FrameRequest>) -> Json<FrameAck> {
    tracing::debug!(
        "Frame from connection {} ({} bytes)",
        payload.connection_id,
        payload.body.as_deref().map(str::len).unwrap_or(0)
    );
    Json(FrameAck { acknowledged: true })
}
