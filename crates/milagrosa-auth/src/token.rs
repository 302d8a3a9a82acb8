//! Bearer token decoding.
//!
//! The client reads claims for UI decisions only. Signatures are never
//! verified here: the server that issued the token is the only party
//! that enforces anything with it.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;

use crate::error::AuthError;

/// Claims read from a bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject, the account e-mail.
    pub sub: String,
    /// Raw authority strings, in the order the token lists them.
    pub authorities: Vec<String>,
    /// Issued-at (Unix timestamp).
    pub iat: i64,
    /// Expiration (Unix timestamp), when the issuer sets one.
    pub exp: Option<i64>,
}

/// An authority entry, either `"ROLE_ADMIN"` or `{"authority": "ROLE_ADMIN"}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum AuthorityClaim {
    Name(String),
    Granted { authority: String },
}

impl AuthorityClaim {
    fn into_name(self) -> String {
        match self {
            AuthorityClaim::Name(name) => name,
            AuthorityClaim::Granted { authority } => authority,
        }
    }
}

#[derive(Deserialize)]
struct RawClaims {
    sub: String,
    #[serde(default)]
    authorities: Vec<AuthorityClaim>,
    #[serde(default)]
    roles: Vec<AuthorityClaim>,
    #[serde(default)]
    role: Option<String>,
    iat: i64,
    #[serde(default)]
    exp: Option<i64>,
}

impl From<RawClaims> for Claims {
    fn from(raw: RawClaims) -> Self {
        let authorities = raw
            .authorities
            .into_iter()
            .chain(raw.roles)
            .map(AuthorityClaim::into_name)
            .chain(raw.role)
            .collect();
        Claims {
            sub: raw.sub,
            authorities,
            iat: raw.iat,
            exp: raw.exp,
        }
    }
}

impl Claims {
    pub fn issued_at(&self) -> Result<DateTime<Utc>, AuthError> {
        timestamp(self.iat, "iat")
    }

    pub fn expires_at(&self) -> Result<Option<DateTime<Utc>>, AuthError> {
        self.exp.map(|exp| timestamp(exp, "exp")).transpose()
    }

    /// Whether `exp` lies more than `leeway_secs` before `now`.
    /// Tokens without `exp` never expire client-side.
    pub fn is_expired_at(&self, now: DateTime<Utc>, leeway_secs: i64) -> bool {
        match self.exp {
            Some(exp) => exp.saturating_add(leeway_secs) < now.timestamp(),
            None => false,
        }
    }
}

fn timestamp(secs: i64, claim: &str) -> Result<DateTime<Utc>, AuthError> {
    Utc.timestamp_opt(secs, 0)
        .single()
        .ok_or_else(|| AuthError::TokenInvalid(format!("{claim} out of range: {secs}")))
}

/// Decode the claims of a compact JWT (`header.payload.signature`).
///
/// Fails with [`AuthError::TokenInvalid`] on anything that does not parse.
/// Pure: no clock, no storage.
pub fn decode(token: &str) -> Result<Claims, AuthError> {
    let token = token.trim();
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 || segments[..2].iter().any(|s| s.is_empty()) {
        return Err(AuthError::TokenInvalid(format!(
            "expected 3 dot-separated segments, got {}",
            segments.len()
        )));
    }

    // Any JSON object is accepted as a header, whatever its `alg`.
    let header = segment_bytes(segments[0], "header")?;
    serde_json::from_slice::<serde_json::Map<String, serde_json::Value>>(&header)
        .map_err(|e| AuthError::TokenInvalid(format!("header json: {e}")))?;

    let payload = segment_bytes(segments[1], "payload")?;
    serde_json::from_slice::<RawClaims>(&payload)
        .map(Claims::from)
        .map_err(|e| AuthError::TokenInvalid(format!("payload json: {e}")))
}

fn segment_bytes(segment: &str, part: &str) -> Result<Vec<u8>, AuthError> {
    URL_SAFE_NO_PAD
        .decode(segment.trim_end_matches('='))
        .map_err(|e| AuthError::TokenInvalid(format!("{part} base64: {e}")))
}
