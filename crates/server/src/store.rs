//! Durable connection registry.
//!
//! Every handler invocation runs in a fresh, stateless unit of execution,
//! so the store is the only place a connection list can live. Nothing in
//! this service caches records across invocations.

use async_trait::async_trait;
use aurora_db::Aurora;
use chrono::{DateTime, Utc};
use std::sync::Arc;

use mediqueue_shared::{ConnectionRecord, Scope, StoreError};

/// Durable mapping from connection id to connection metadata.
///
/// Every operation is a single atomic key-value operation; concurrent
/// handshake and disconnect for different connection ids need no
/// coordination.
#[async_trait]
pub trait ConnectionStore: Send + Sync {
    /// Idempotent upsert keyed by `connection_id`. Overwrite wins.
    async fn put(&self, record: ConnectionRecord) -> Result<(), StoreError>;

    /// Idempotent removal. Deleting a missing id is not an error.
    async fn delete(&self, connection_id: &str) -> Result<(), StoreError>;

    /// Snapshot of all live records.
    async fn list_all(&self) -> Result<Vec<ConnectionRecord>, StoreError>;

    /// Snapshot of live records with exactly the given scope.
    async fn list_by_scope(&self, scope: &Scope) -> Result<Vec<ConnectionRecord>, StoreError>;
}

/// `ConnectionStore` backed by the Aurora document database.
pub struct AuroraConnectionStore {
    db: Arc<Aurora>,
}

/// Live records carry this status; listings filter on it.
const STATUS_OPEN: &str = "open";

impl AuroraConnectionStore {
    pub fn new(db: Arc<Aurora>) -> Self {
        Self { db }
    }

    /// Collect matching docs, drop and best-effort delete records whose
    /// TTL watermark has passed. The store has no native expiry, so the
    /// scan is where orphaned records get reaped.
    async fn scan(&self, scope: Option<&Scope>) -> Result<Vec<ConnectionRecord>, StoreError> {
        let docs = match scope {
            Some(scope) => {
                let scope = scope.as_str().to_string();
                self.db
                    .query("connections")
                    .filter(|f| f.eq("status", STATUS_OPEN) & f.eq("scope", scope.clone()))
                    .collect()
                    .await
            }
            None => {
                self.db
                    .query("connections")
                    .filter(|f| f.eq("status", STATUS_OPEN))
                    .collect()
                    .await
            }
        }
        .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        let now = Utc::now();
        let mut records = Vec::new();
        for doc in docs {
            let connection_id = doc
                .data
                .get("connection_id")
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string();
            let established_at = doc
                .data
                .get("established_at")
                .and_then(|v| v.as_str())
                .and_then(parse_timestamp);
            let Some(established_at) = established_at else {
                tracing::warn!("Skipping malformed connection record {}", doc.id);
                continue;
            };
            if connection_id.is_empty() {
                tracing::warn!("Skipping malformed connection record {}", doc.id);
                continue;
            }

            let scope = doc
                .data
                .get("scope")
                .and_then(|v| v.as_str())
                .filter(|s| !s.is_empty())
                .map(|s| Scope::from(s.to_string()));
            let expires_at = doc
                .data
                .get("expires_at")
                .and_then(|v| v.as_str())
                .filter(|s| !s.is_empty())
                .and_then(parse_timestamp);

            let record = ConnectionRecord {
                connection_id,
                established_at,
                scope,
                expires_at,
            };

            if record.is_expired(now) {
                tracing::debug!(
                    "Reaping expired connection record: {}",
                    record.connection_id
                );
                if let Err(e) = self.db.delete(&format!("connections:{}", doc.id)).await {
                    tracing::warn!("Failed to reap expired record {}: {}", doc.id, e);
                }
                continue;
            }
            records.push(record);
        }
        Ok(records)
    }
}

#[async_trait]
impl ConnectionStore for AuroraConnectionStore {
    async fn put(&self, record: ConnectionRecord) -> Result<(), StoreError> {
        let scope = record
            .scope
            .as_ref()
            .map(|s| s.as_str().to_string())
            .unwrap_or_default();
        let expires_at = record
            .expires_at
            .map(|t| t.to_rfc3339())
            .unwrap_or_default();
        let fields = vec![
            ("connection_id", record.connection_id.clone().into()),
            ("status", STATUS_OPEN.into()),
            ("scope", scope.into()),
            ("established_at", record.established_at.to_rfc3339().into()),
            ("expires_at", expires_at.into()),
        ];

        let existing = self
            .db
            .query("connections")
            .filter(|f| f.eq("connection_id", record.connection_id.clone()))
            .collect()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        if let Some(doc) = existing.into_iter().next() {
            self.db
                .update_document("connections", &doc.id, fields)
                .await
                .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        } else {
            self.db
                .insert_into("connections", fields)
                .await
                .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        }

        Ok(())
    }

    async fn delete(&self, connection_id: &str) -> Result<(), StoreError> {
        let docs = self
            .db
            .query("connections")
            .filter(|f| f.eq("connection_id", connection_id.to_string()))
            .collect()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        for doc in docs {
            self.db
                .delete(&format!("connections:{}", doc.id))
                .await
                .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        }

        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<ConnectionRecord>, StoreError> {
        self.scan(None).await
    }

    async fn list_by_scope(&self, scope: &Scope) -> Result<Vec<ConnectionRecord>, StoreError> {
        self.scan(Some(scope)).await
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}
