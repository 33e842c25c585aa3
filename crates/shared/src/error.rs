//! Error taxonomy for the realtime push subsystem.

use thiserror::Error;

/// Failure of a connection-store operation. All store errors are treated
/// as transient; the caller decides whether to fail the operation or
/// log and continue.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("connection store unavailable: {0}")]
    Unavailable(String),
}

/// Outcome classification for a single deliver-to-connection attempt.
///
/// `Gone` is the gateway's explicit stale-channel signal (the HTTP 410
/// equivalent) and is the only thing that triggers a prune. A timeout
/// does not prove the peer is dead, so it classifies as `Transient`.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("connection gone")]
    Gone,
    #[error("delivery failed: {0}")]
    Transient(String),
}

/// Failure of a whole broadcast. Individual delivery failures never
/// surface here; only target resolution or envelope serialization can
/// fail the broadcast. Callers treat this as "no one was notified this
/// time", never as a reason to fail the business operation.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("failed to serialize event: {0}")]
    Encode(#[from] serde_json::Error),
}
