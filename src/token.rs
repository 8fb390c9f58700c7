//! Session-token claim decoding.
//!
//! SYSTEM CONTEXT
//! ==============
//! The backend issues a signed JWT at login. The client never holds the
//! signing key, so it only reads the claims it needs (role, user id, expiry)
//! to rehydrate a session without a network call. The backend still verifies
//! the signature on every request.

use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::Deserialize;

use crate::role::Role;

/// Errors produced while reading claims from a session token.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// The token is not a well-formed JWT.
    #[error("malformed token: {0}")]
    Malformed(String),

    /// The token carries no role claim.
    #[error("token has no role claim")]
    MissingRole,

    /// The role claim names no known role.
    #[error(transparent)]
    UnknownRole(#[from] crate::role::UnknownRole),

    /// The `exp` claim lies in the past.
    #[error("token expired at {expired_at}")]
    Expired { expired_at: i64 },
}

/// Claims the client relies on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    pub role: Role,
    pub user_id: Option<String>,
    /// `exp` claim in seconds since the Unix epoch.
    pub expires_at: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct RawClaims {
    #[serde(default)]
    role: Option<String>,
    #[serde(default, alias = "userId")]
    user_id: Option<serde_json::Value>,
    #[serde(default)]
    exp: Option<i64>,
}

/// Decode claims from `token` and reject it if it has expired.
///
/// # Errors
///
/// Returns a [`TokenError`] if the token cannot be parsed, lacks a usable
/// role claim, or is past its `exp`.
pub fn decode_claims(token: &str) -> Result<TokenClaims, TokenError> {
    decode_claims_at(token, now_secs())
}

/// Same as [`decode_claims`] with an explicit clock, in seconds.
///
/// # Errors
///
/// See [`decode_claims`].
pub fn decode_claims_at(token: &str, now: i64) -> Result<TokenClaims, TokenError> {
    let claims = read_claims(token)?;
    if let Some(exp) = claims.expires_at
        && exp <= now
    {
        return Err(TokenError::Expired { expired_at: exp });
    }
    Ok(claims)
}

fn read_claims(token: &str) -> Result<TokenClaims, TokenError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let data = decode::<RawClaims>(token.trim(), &DecodingKey::from_secret(&[]), &validation)
        .map_err(|e| TokenError::Malformed(e.to_string()))?;
    let raw = data.claims;

    let role = raw.role.ok_or(TokenError::MissingRole)?.parse::<Role>()?;
    let user_id = raw.user_id.and_then(|value| match value {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    });

    Ok(TokenClaims { role, user_id, expires_at: raw.exp })
}

fn now_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
}

#[cfg(test)]
#[path = "token_test.rs"]
mod tests;
