//! OAuth2 refresh grant against the configured token endpoint

use anyhow::{Context, Result};
use oauth2::{
    basic::BasicClient, AuthUrl, ClientId, ClientSecret, RefreshToken, TokenResponse, TokenUrl,
};

use crate::config::Credentials;

/// Result of a successful refresh exchange.
pub struct RefreshedToken {
    pub access_token: String,
    pub expires_in_secs: Option<u64>,
    /// Present when the server rotates the refresh token.
    pub refresh_token: Option<String>,
}

/// Build the OAuth2 client from the loaded credentials.
fn build_client(creds: &Credentials) -> Result<BasicClient> {
    let auth_url = AuthUrl::new(creds.auth_url.clone()).context("Invalid auth URL")?;
    let token_url = TokenUrl::new(creds.token_url.clone()).context("Invalid token URL")?;

    Ok(BasicClient::new(
        ClientId::new(creds.client_id.clone()),
        Some(ClientSecret::new(creds.client_secret.clone())),
        auth_url,
        Some(token_url),
    ))
}

/// Exchange a refresh token for a new access token.
pub async fn refresh_access_token(
    creds: &Credentials,
    refresh_token: &str,
) -> Result<RefreshedToken> {
    let client = build_client(creds)?;

    tracing::info!("Refreshing access token...");

    let token_response = client
        .exchange_refresh_token(&RefreshToken::new(refresh_token.to_string()))
        .request_async(oauth2::reqwest::async_http_client)
        .await
        .context("Refresh token exchange failed")?;

    Ok(RefreshedToken {
        access_token: token_response.access_token().secret().to_string(),
        expires_in_secs: token_response.expires_in().map(|d| d.as_secs()),
        refresh_token: token_response
            .refresh_token()
            .map(|rt| rt.secret().to_string()),
    })
}
