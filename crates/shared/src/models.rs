//! Connection registry models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Routing attribute on a connection record, used to target broadcasts
/// narrower than "everyone".
///
/// Kept as an open string tag rather than a closed enum so new scopes
/// (e.g. per-user) can be introduced without a schema change.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Scope(String);

impl Scope {
    /// Scope for a single doctor's queue: `doctor:{doctor_id}`.
    pub fn doctor(doctor_id: &str) -> Self {
        Scope(format!("doctor:{doctor_id}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for Scope {
    fn from(value: String) -> Self {
        Scope(value)
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One live push channel, keyed by the opaque connection id the push
/// gateway assigned at handshake time.
///
/// The durable store holding these records is the single source of truth
/// for "who is currently listening"; handlers re-read it on every
/// invocation instead of caching a connection list in memory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionRecord {
    pub connection_id: String,
    pub established_at: DateTime<Utc>,
    /// Absent means the connection receives clinic-wide events only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<Scope>,
    /// Expiry watermark so records orphaned by a missed disconnect
    /// notification self-expire instead of leaking forever.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl ConnectionRecord {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires_at) => expires_at <= now,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    #[test]
    fn doctor_scope_format() {
        let scope = Scope::doctor("d-17");
        assert_eq!(scope.as_str(), "doctor:d-17");
    }

    #[test]
    fn record_without_ttl_never_expires() {
        let record = ConnectionRecord {
            connection_id: "abc".to_string(),
            established_at: Utc::now(),
            scope: None,
            expires_at: None,
        };
        assert!(!record.is_expired(Utc::now() + TimeDelta::days(365)));
    }

    #[test]
    fn record_expires_at_watermark() {
        let now = Utc::now();
        let record = ConnectionRecord {
            connection_id: "abc".to_string(),
            established_at: now,
            scope: None,
            expires_at: Some(now + TimeDelta::hours(2)),
        };
        assert!(!record.is_expired(now));
        assert!(record.is_expired(now + TimeDelta::hours(2)));
        assert!(record.is_expired(now + TimeDelta::hours(3)));
    }

    #[test]
    fn record_wire_shape_is_camel_case() {
        let record = ConnectionRecord {
            connection_id: "gw-1".to_string(),
            established_at: "2024-05-01T08:00:00Z".parse().unwrap(),
            scope: Some(Scope::doctor("d1")),
            expires_at: None,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["connectionId"], "gw-1");
        assert_eq!(json["scope"], "doctor:d1");
        assert!(json.get("expiresAt").is_none());
    }
}
