//! JWT payload decoding.
//!
//! The payload is decoded without verification: the server verified the
//! token when it issued it, the client only needs the roles and expiry.

use std::collections::HashMap;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use base64::Engine;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::api::types::InstitutionType;

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("Invalid JWT format")]
    Format,

    #[error("Failed to decode JWT payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Failed to parse JWT payload: {0}")]
    Json(#[from] serde_json::Error),
}

/// Claims carried by an IMIS access token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JwtClaims {
    #[serde(default)]
    pub sub: Option<String>,
    /// Institution types, with or without the `ROLE_` prefix.
    #[serde(default)]
    pub roles: Vec<String>,
    /// Expiry as UNIX seconds. A token without one counts as expired.
    #[serde(default)]
    pub exp: i64,
    #[serde(flatten)]
    pub other: HashMap<String, serde_json::Value>,
}

impl JwtClaims {
    /// Roles that name a known institution type. Unknown roles are dropped.
    pub fn institution_roles(&self) -> Vec<InstitutionType> {
        self.roles
            .iter()
            .filter_map(|r| InstitutionType::from_role(r))
            .collect()
    }

    /// `None` when the expiry lies beyond what `SystemTime` can represent.
    pub fn expires_at(&self) -> Option<SystemTime> {
        let secs = u64::try_from(self.exp).unwrap_or(0);
        let millis = secs.checked_mul(1000)?;
        UNIX_EPOCH.checked_add(Duration::from_millis(millis))
    }

    /// A token stays valid only while its expiry lies strictly after `now`.
    pub fn is_expired_at(&self, now: SystemTime) -> bool {
        match self.expires_at() {
            Some(expiry) => expiry <= now,
            None => false,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(SystemTime::now())
    }
}

/// Decode the claims of a `header.payload.signature` token.
pub fn parse_jwt(token: &str) -> Result<JwtClaims, JwtError> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err(JwtError::Format);
    }

    // base64url, padding optional
    let payload = parts[1].trim_end_matches('=');
    let decoded = base64::engine::general_purpose::URL_SAFE_NO_PAD.decode(payload)?;

    Ok(serde_json::from_slice(&decoded)?)
}
