//! Event publisher / broadcaster.
//!
//! `publish` is the only entry point business-logic code needs: it
//! resolves the target set from the store, delivers the serialized event
//! to every target in parallel, and prunes targets the gateway reports
//! as gone. Broadcast failures are isolated here: a failed publish means
//! "no one was notified this time", never a failed business operation.

use futures_util::future::join_all;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use mediqueue_shared::{DeliveryError, PublishError, RealtimeEvent};

use crate::gateway::PushGateway;
use crate::store::ConnectionStore;

/// Per-broadcast delivery tally, returned for observability only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PublishSummary {
    pub delivered: usize,
    pub pruned: usize,
    pub failed: usize,
}

/// Broadcasts typed events to the connections matching their scope.
///
/// Holds the store and gateway as process-scoped injected dependencies:
/// init once at startup, reuse for every broadcast, no teardown.
#[derive(Clone)]
pub struct Publisher {
    store: Arc<dyn ConnectionStore>,
    gateway: Arc<dyn PushGateway>,
}

impl Publisher {
    pub fn new(store: Arc<dyn ConnectionStore>, gateway: Arc<dyn PushGateway>) -> Self {
        Self { store, gateway }
    }

    /// Broadcast one event to every connection matching its scope.
    ///
    /// Returns once all delivery attempts have settled. Each attempt is
    /// independent: one dead or slow connection never blocks or cancels
    /// delivery to the rest, and no ordering is guaranteed across
    /// targets.
    pub async fn publish(&self, event: &RealtimeEvent) -> Result<PublishSummary, PublishError> {
        let targets = match event.target_scope() {
            Some(scope) => self.store.list_by_scope(&scope).await?,
            None => self.store.list_all().await?,
        };

        if targets.is_empty() {
            tracing::debug!("No connections listening for {}", event.type_name());
            return Ok(PublishSummary::default());
        }

        // Serialize once; every target gets the same envelope bytes.
        let payload = serde_json::to_vec(event)?;

        let broadcast_id = Uuid::new_v4();
        tracing::debug!(
            "Broadcast {} ({}) to {} connection(s)",
            broadcast_id,
            event.type_name(),
            targets.len()
        );

        let payload = &payload;
        let attempts = targets.iter().map(|record| async move {
            let outcome = self.gateway.deliver(&record.connection_id, payload).await;
            (&record.connection_id, outcome)
        });

        let mut summary = PublishSummary::default();
        for (connection_id, outcome) in join_all(attempts).await {
            match outcome {
                Ok(()) => summary.delivered += 1,
                Err(DeliveryError::Gone) => {
                    // The gateway reported the channel dead; self-heal.
                    tracing::info!("Pruning stale connection {}", connection_id);
                    if let Err(e) = self.store.delete(connection_id).await {
                        tracing::error!("Failed to prune connection {}: {}", connection_id, e);
                    }
                    summary.pruned += 1;
                }
                Err(DeliveryError::Transient(cause)) => {
                    // May be transient; the record stays and the next
                    // organic broadcast is the implicit retry.
                    tracing::error!("Delivery to connection {} failed: {}", connection_id, cause);
                    summary.failed += 1;
                }
            }
        }

        tracing::debug!(
            "Broadcast {} settled: {} delivered, {} pruned, {} failed",
            broadcast_id,
            summary.delivered,
            summary.pruned,
            summary.failed
        );
        Ok(summary)
    }
}
