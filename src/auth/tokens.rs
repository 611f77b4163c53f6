//! Token records and expiry handling

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Kind of a stored token. Only access tokens are stored today, but the
/// store is keyed by kind so the record shape does not change if more are
/// added.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Access => "access",
        }
    }
}

/// Stored access token for one user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenRecord {
    pub user_id: String,
    pub kind: TokenKind,
    pub token: String,
    pub refresh_token: Option<String>,
    /// Expiry as epoch milliseconds. None means no known expiry.
    pub expires_at: Option<u64>,
    /// Scheme value, e.g. "Bearer".
    pub token_type: Option<String>,
}

/// Tokens within this many milliseconds of expiry count as expired, so a
/// token does not lapse mid-request.
const EXPIRY_SKEW_MS: u64 = 30_000;

impl TokenRecord {
    pub fn new(user_id: String, token: String, expires_in_secs: Option<u64>) -> Self {
        let expires_at = expires_in_secs.map(|secs| now_ms() + secs * 1000);
        Self {
            user_id,
            kind: TokenKind::Access,
            token,
            refresh_token: None,
            expires_at,
            token_type: Some("Bearer".to_string()),
        }
    }

    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(exp) => now_ms() + EXPIRY_SKEW_MS >= exp,
            None => false,
        }
    }
}

pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
