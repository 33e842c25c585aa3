//! Internal surface for the clinic backend and operators.

use axum::{extract::State, http::StatusCode, Json};

use mediqueue_shared::{ConnectionRecord, RealtimeEvent};

use crate::publisher::PublishSummary;
use crate::state::AppState;

/// Broadcast an event to the connections matching its scope. Returns
/// once every delivery attempt has settled. A 500 here means "no one
/// was notified this time"; callers must not roll back business state
/// over it.
pub async fn publish_event(
    State(state): State<AppState>,
    Json(event): Json<RealtimeEvent>,
) -> Result<Json<PublishSummary>, (StatusCode, String)> {
    let summary = state.publisher.publish(&event).await.map_err(|e| {
        tracing::error!("Broadcast of {} failed: {}", event.type_name(), e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Broadcast failed: {e}"),
        )
    })?;
    Ok(Json(summary))
}

/// Snapshot of the live connection registry.
pub async fn list_connections(
    State(state): State<AppState>,
) -> Result<Json<Vec<ConnectionRecord>>, (StatusCode, String)> {
    let records = state.store.list_all().await.map_err(|e| {
        tracing::error!("Failed to list connections: {}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, format!("Store error: {e}"))
    })?;
    Ok(Json(records))
}

/// Liveness probe.
pub async fn healthz() -> StatusCode {
    StatusCode::OK
}
