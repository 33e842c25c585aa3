//! Test doubles for the connection store and the push gateway.

use async_trait::async_trait;
use chrono::{TimeDelta, Utc};
use jsonwebtoken::{EncodingKey, Header};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::RwLock;

use mediqueue_shared::{ConnectionRecord, DeliveryError, Scope, StoreError};

use crate::config::Config;
use crate::gateway::PushGateway;
use crate::middleware::bearer::StaffClaims;
use crate::state::AppState;
use crate::store::ConnectionStore;

/// In-memory `ConnectionStore` with the same upsert/delete/scan
/// semantics as the durable implementation.
pub(crate) struct MemoryConnectionStore {
    records: RwLock<HashMap<String, ConnectionRecord>>,
}

impl MemoryConnectionStore {
    pub(crate) fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl ConnectionStore for MemoryConnectionStore {
    async fn put(&self, record: ConnectionRecord) -> Result<(), StoreError> {
        self.records
            .write()
            .await
            .insert(record.connection_id.clone(), record);
        Ok(())
    }

    async fn delete(&self, connection_id: &str) -> Result<(), StoreError> {
        self.records.write().await.remove(connection_id);
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<ConnectionRecord>, StoreError> {
        let now = Utc::now();
        Ok(self
            .records
            .read()
            .await
            .values()
            .filter(|r| !r.is_expired(now))
            .cloned()
            .collect())
    }

    async fn list_by_scope(&self, scope: &Scope) -> Result<Vec<ConnectionRecord>, StoreError> {
        let now = Utc::now();
        Ok(self
            .records
            .read()
            .await
            .values()
            .filter(|r| !r.is_expired(now) && r.scope.as_ref() == Some(scope))
            .cloned()
            .collect())
    }
}

/// `ConnectionStore` whose every operation fails, for store-outage
/// behavior.
pub(crate) struct FailingConnectionStore;

#[async_trait]
impl ConnectionStore for FailingConnectionStore {
    async fn put(&self, _record: ConnectionRecord) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("store offline".to_string()))
    }

    async fn delete(&self, _connection_id: &str) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("store offline".to_string()))
    }

    async fn list_all(&self) -> Result<Vec<ConnectionRecord>, StoreError> {
        Err(StoreError::Unavailable("store offline".to_string()))
    }

    async fn list_by_scope(&self, _scope: &Scope) -> Result<Vec<ConnectionRecord>, StoreError> {
        Err(StoreError::Unavailable("store offline".to_string()))
    }
}

enum ScriptedOutcome {
    Gone,
    Transient,
}

/// Fake `PushGateway` recording every delivery, with per-connection
/// scripted failures.
pub(crate) struct ScriptedGateway {
    script: Mutex<HashMap<String, ScriptedOutcome>>,
    deliveries: Mutex<Vec<(String, Vec<u8>)>>,
}

impl ScriptedGateway {
    pub(crate) fn new() -> Self {
        Self {
            script: Mutex::new(HashMap::new()),
            deliveries: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn fail_with_gone(&self, connection_id: &str) {
        self.script
            .lock()
            .unwrap()
            .insert(connection_id.to_string(), ScriptedOutcome::Gone);
    }

    pub(crate) fn fail_with_transient(&self, connection_id: &str) {
        self.script
            .lock()
            .unwrap()
            .insert(connection_id.to_string(), ScriptedOutcome::Transient);
    }

    pub(crate) fn clear_script(&self) {
        self.script.lock().unwrap().clear();
    }

    /// Every delivery attempted so far, in settlement order.
    pub(crate) fn deliveries(&self) -> Vec<(String, Vec<u8>)> {
        self.deliveries.lock().unwrap().clone()
    }

    pub(crate) fn delivered_to(&self) -> Vec<String> {
        self.deliveries()
            .into_iter()
            .map(|(connection_id, _)| connection_id)
            .collect()
    }
}

#[async_trait]
impl PushGateway for ScriptedGateway {
    async fn deliver(&self, connection_id: &str, payload: &[u8]) -> Result<(), DeliveryError> {
        self.deliveries
            .lock()
            .unwrap()
            .push((connection_id.to_string(), payload.to_vec()));

        match self.script.lock().unwrap().get(connection_id) {
            None => Ok(()),
            Some(ScriptedOutcome::Gone) => Err(DeliveryError::Gone),
            Some(ScriptedOutcome::Transient) => {
                Err(DeliveryError::Transient("connection reset".to_string()))
            }
        }
    }
}

/// Sign a staff access token with the test secret. Negative `ttl_secs`
/// mints an already-expired token.
pub(crate) fn mint_token(
    secret: &str,
    sub: &str,
    role: &str,
    doctor_id: Option<&str>,
    ttl_secs: i64,
) -> String {
    let now = Utc::now().timestamp();
    let claims = StaffClaims {
        sub: sub.to_string(),
        role: role.to_string(),
        doctor_id: doctor_id.map(str::to_string),
        iat: now as usize,
        exp: (now + ttl_secs) as usize,
    };
    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

pub(crate) fn test_config() -> Config {
    Config {
        bind_addr: "127.0.0.1:0".to_string(),
        db_path: "unused".to_string(),
        gateway_url: "http://gateway.test".to_string(),
        auth_secret: "test-secret".to_string(),
        connection_ttl: TimeDelta::hours(2),
        deliver_timeout: Duration::from_secs(10),
    }
}

pub(crate) fn test_state_with_store(
    store: Arc<dyn ConnectionStore>,
    gateway: Arc<dyn PushGateway>,
) -> AppState {
    AppState::new(test_config(), store, gateway)
}

pub(crate) fn test_state(gateway: Arc<dyn PushGateway>) -> AppState {
    test_state_with_store(Arc::new(MemoryConnectionStore::new()), gateway)
}
