//! Three-tier credential resolution
//!
//! Order: token embedded in the inbound event, then the stored token for
//! the user (refreshed when expired), then the static fallback from
//! configuration. A failed refresh is an error, not a fall-through to the
//! fallback tier.

use thiserror::Error;

use super::oauth;
use super::store::TokenStore;
use super::tokens::{now_ms, TokenKind, TokenRecord};
use crate::config::Credentials;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("stored token expired and no refresh token is available")]
    NoRefreshToken,
    #[error("token refresh failed: {0}")]
    RefreshFailed(String),
    #[error("token store error: {0}")]
    Store(String),
}

/// Resolve an access token for this invocation. `Ok(None)` means no
/// credential source produced anything.
pub async fn resolve_access_token(
    event_token: Option<&str>,
    user_id: Option<&str>,
    store: &dyn TokenStore,
    creds: Option<&Credentials>,
    fallback: Option<&str>,
) -> Result<Option<String>, AuthError> {
    // (a) pre-authenticated channel: token carried in the event itself
    if let Some(token) = event_token.filter(|t| !t.is_empty()) {
        tracing::debug!("Using access token from inbound event");
        return Ok(Some(token.to_string()));
    }

    // (b) stored token, refreshed on expiry
    if let Some(uid) = user_id {
        let record = store
            .get(uid, TokenKind::Access)
            .map_err(|e| AuthError::Store(format!("{:#}", e)))?;
        if let Some(record) = record {
            if !record.is_expired() {
                tracing::debug!(user = uid, "Using stored access token");
                return Ok(Some(record.token));
            }
            return refresh_stored(record, store, creds).await.map(Some);
        }
    }

    // (c) static fallback
    if let Some(token) = fallback.filter(|t| !t.is_empty()) {
        tracing::debug!("Using static fallback token");
        return Ok(Some(token.to_string()));
    }

    Ok(None)
}

async fn refresh_stored(
    record: TokenRecord,
    store: &dyn TokenStore,
    creds: Option<&Credentials>,
) -> Result<String, AuthError> {
    let refresh_token = record
        .refresh_token
        .as_deref()
        .ok_or(AuthError::NoRefreshToken)?;
    let creds = creds.ok_or_else(|| {
        AuthError::RefreshFailed("no OAuth client credentials loaded".to_string())
    })?;

    tracing::info!(user = %record.user_id, "Stored token expired, refreshing");
    let refreshed = oauth::refresh_access_token(creds, refresh_token)
        .await
        .map_err(|e| AuthError::RefreshFailed(format!("{:#}", e)))?;

    let new_record = TokenRecord {
        user_id: record.user_id.clone(),
        kind: record.kind,
        token: refreshed.access_token.clone(),
        // Keep the old refresh token unless the server rotated it
        refresh_token: refreshed
            .refresh_token
            .or_else(|| record.refresh_token.clone()),
        expires_at: refreshed.expires_in_secs.map(|s| now_ms() + s * 1000),
        token_type: record.token_type.clone(),
    };
    store
        .put(new_record)
        .map_err(|e| AuthError::Store(format!("{:#}", e)))?;
    tracing::info!(user = %record.user_id, "Token refreshed and persisted");

    Ok(refreshed.access_token)
}
