//! HTTP client for the gardening-status API
//!
//! Wraps reqwest::Client with a fixed per-request timeout and optional
//! bearer auth, and maps HTTP failures to distinct error kinds.

use std::time::Duration;

use thiserror::Error;

use super::models::{HealthReport, PlantDetail, TeamDetail, TeamSummary, TeamsResponse};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("unauthorized (401) for {0}")]
    Unauthorized(String),
    #[error("not found (404) for {0}")]
    NotFound(String),
    #[error("service unavailable (HTTP {status}) for {url}")]
    ServiceUnavailable { status: u16, url: String },
    #[error("request to {0} timed out")]
    Timeout(String),
    #[error("request failed: {0}")]
    Failed(String),
}

/// Client for the remote plant-status API.
pub struct GardenClient {
    http: reqwest::Client,
    base_url: String,
}

impl GardenClient {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// GET with optional bearer auth.
    async fn get(&self, path: &str, token: Option<&str>) -> Result<reqwest::Response, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("GET {}", url);

        let mut req = self.http.get(&url);
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }

        let resp = req.send().await.map_err(|e| {
            if e.is_timeout() {
                ApiError::Timeout(url.clone())
            } else {
                ApiError::Failed(format!("GET {}: {}", url, e))
            }
        })?;

        check_response(resp, &url)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&str>,
    ) -> Result<T, ApiError> {
        let resp = self.get(path, token).await?;
        resp.json()
            .await
            .map_err(|e| ApiError::Failed(format!("parsing {} response: {}", path, e)))
    }

    /// Health check. Works unauthenticated against open deployments;
    /// locked-down ones answer 401 without a token.
    pub async fn health(&self, token: Option<&str>) -> Result<HealthReport, ApiError> {
        self.get_json("/health", token).await
    }

    pub async fn list_teams(&self, token: &str) -> Result<Vec<TeamSummary>, ApiError> {
        let resp: TeamsResponse = self.get_json("/teams", Some(token)).await?;
        Ok(resp.teams)
    }

    pub async fn team_detail(&self, token: &str, id: &str) -> Result<TeamDetail, ApiError> {
        self.get_json(&format!("/teams/{}", id), Some(token)).await
    }

    pub async fn plant_detail(&self, token: &str, id: &str) -> Result<PlantDetail, ApiError> {
        self.get_json(&format!("/plants/{}", id), Some(token)).await
    }
}

/// Map HTTP status codes to the error taxonomy.
fn check_response(resp: reqwest::Response, url: &str) -> Result<reqwest::Response, ApiError> {
    let status = resp.status();
    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Err(ApiError::Unauthorized(url.to_string()));
    }
    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(ApiError::NotFound(url.to_string()));
    }
    if status.is_server_error() {
        return Err(ApiError::ServiceUnavailable {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }
    if !status.is_success() {
        return Err(ApiError::Failed(format!("HTTP {} for {}", status.as_u16(), url)));
    }
    Ok(resp)
}
