//! Push gateway adapter.
//!
//! The hosting platform's gateway terminates the client WebSockets; this
//! service only calls its deliver API. Provider status codes are mapped
//! to the `DeliveryError` taxonomy here, at the adapter boundary, so the
//! publisher's prune-vs-retain decision stays a match on a tagged error.

use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;

use mediqueue_shared::DeliveryError;

/// Deliver-to-connection primitive provided by the push gateway.
#[async_trait]
pub trait PushGateway: Send + Sync {
    async fn deliver(&self, connection_id: &str, payload: &[u8]) -> Result<(), DeliveryError>;
}

/// `PushGateway` over the gateway's HTTP deliver API:
/// `POST {base_url}/connections/{connection_id}` with the serialized
/// event envelope as the body. HTTP 410 is the stale-channel signal.
pub struct HttpPushGateway {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl HttpPushGateway {
    pub fn new(base_url: String, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            timeout,
        }
    }
}

#[async_trait]
impl PushGateway for HttpPushGateway {
    async fn deliver(&self, connection_id: &str, payload: &[u8]) -> Result<(), DeliveryError> {
        let url = format!("{}/connections/{}", self.base_url, connection_id);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .body(payload.to_vec())
            .timeout(self.timeout)
            .send()
            .await
            // A timeout or connect error does not prove the peer is dead.
            .map_err(|e| DeliveryError::Transient(e.to_string()))?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::GONE => Err(DeliveryError::Gone),
            status => Err(DeliveryError::Transient(format!(
                "gateway returned status {status}"
            ))),
        }
    }
}
