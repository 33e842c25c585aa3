//! Server configuration from environment variables.

use anyhow::{Context, Result};
use chrono::TimeDelta;
use std::time::Duration;

/// Runtime configuration, read once at startup.
///
/// Environment variables:
/// - `MEDIQUEUE_BIND_ADDR`: listen address (default: "0.0.0.0:8080")
/// - `MEDIQUEUE_DB_PATH`: connection store path (default: "mediqueue_db_data")
/// - `MEDIQUEUE_GATEWAY_URL`: base URL of the push gateway's deliver API (required)
/// - `MEDIQUEUE_AUTH_SECRET`: HS256 secret for bearer token validation (required)
/// - `MEDIQUEUE_CONNECTION_TTL_SECS`: orphaned-record expiry window (default: 7200)
/// - `MEDIQUEUE_DELIVER_TIMEOUT_SECS`: per-delivery request timeout (default: 10)
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub db_path: String,
    pub gateway_url: String,
    pub auth_secret: String,
    pub connection_ttl: TimeDelta,
    pub deliver_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let bind_addr = std::env::var("MEDIQUEUE_BIND_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:8080".to_string());
        let db_path = std::env::var("MEDIQUEUE_DB_PATH")
            .unwrap_or_else(|_| "mediqueue_db_data".to_string());

        let gateway_url = std::env::var("MEDIQUEUE_GATEWAY_URL")
            .context("MEDIQUEUE_GATEWAY_URL must be set")?
            .trim_end_matches('/')
            .to_string();
        let auth_secret =
            std::env::var("MEDIQUEUE_AUTH_SECRET").context("MEDIQUEUE_AUTH_SECRET must be set")?;

        let ttl_secs = match std::env::var("MEDIQUEUE_CONNECTION_TTL_SECS") {
            Ok(raw) => raw
                .parse::<i64>()
                .context("MEDIQUEUE_CONNECTION_TTL_SECS must be an integer")?,
            Err(_) => 7200,
        };
        let deliver_timeout_secs = match std::env::var("MEDIQUEUE_DELIVER_TIMEOUT_SECS") {
            Ok(raw) => raw
                .parse::<u64>()
                .context("MEDIQUEUE_DELIVER_TIMEOUT_SECS must be an integer")?,
            Err(_) => 10,
        };

        Ok(Self {
            bind_addr,
            db_path,
            gateway_url,
            auth_secret,
            connection_ttl: TimeDelta::seconds(ttl_secs),
            deliver_timeout: Duration::from_secs(deliver_timeout_secs),
        })
    }
}
