//! Bearer token verification for the push channel handshake.
//!
//! The handshake is the only point where unauthenticated access is
//! rejected; once open, the channel is a long-lived bypass of
//! per-request auth. Token issuance lives in the platform's auth
//! service; this module only validates.

use axum::http::HeaderMap;
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use mediqueue_shared::Scope;

pub const ROLE_DOCTOR: &str = "doctor";
pub const ROLE_FRONT_DESK: &str = "front-desk";

/// Claims carried by a staff access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffClaims {
    pub sub: String,
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doctor_id: Option<String>,
    pub iat: usize,
    pub exp: usize,
}

/// Pull the bearer credential from the `Authorization` header, falling
/// back to the `token` query parameter (browser WebSocket clients cannot
/// set headers on the handshake request).
pub fn extract_bearer_token(headers: &HeaderMap, query: Option<&str>) -> Option<String> {
    if let Some(value) = headers.get("Authorization").and_then(|v| v.to_str().ok()) {
        if let Some(token) = value.strip_prefix("Bearer ") {
            return Some(token.trim().to_string());
        }
    }

    let query = query?;
    url::form_urlencoded::parse(query.as_bytes())
        .into_owned()
        .find(|(key, _)| key == "token")
        .map(|(_, value)| value)
}

/// Validate an access token and return its claims.
pub fn validate_access_token(token: &str, secret: &str) -> Result<StaffClaims, String> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_required_spec_claims(&["exp", "sub"]);

    let data = jsonwebtoken::decode::<StaffClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| format!("Invalid token: {e}"))?;
    Ok(data.claims)
}

/// Derive the routing scope from a validated identity. Doctors see their
/// own queue; front-desk staff receive clinic-wide events only.
pub fn derive_scope(claims: &StaffClaims) -> Result<Option<Scope>, String> {
    match claims.role.as_str() {
        ROLE_DOCTOR => {
            let doctor_id = claims
                .doctor_id
                .as_deref()
                .ok_or("Doctor token is missing the doctor id")?;
            Ok(Some(Scope::doctor(doctor_id)))
        }
        ROLE_FRONT_DESK => Ok(None),
        other => Err(format!("Unknown staff role: {other}")),
    }
}
