//! Environment configuration and one-shot credential load
//!
//! `Credentials` is read once per process in `main` and passed down
//! explicitly; nothing here is cached in ambient state.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

/// Process configuration from environment variables.
#[derive(Debug, Default, Clone)]
pub struct AppConfig {
    /// Overrides the api_base_url from the secret blob when set.
    pub api_base_url: Option<String>,
    /// Token store file path; defaults under the project config dir.
    pub token_store_path: Option<PathBuf>,
    /// Path of the secret JSON blob with OAuth client credentials.
    pub secret_file: Option<PathBuf>,
    /// Static fallback access token, used only when no record exists at all.
    pub fallback_token: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            api_base_url: env_nonempty("PLANT_API_BASE_URL"),
            token_store_path: env_nonempty("PLANT_TOKEN_STORE").map(PathBuf::from),
            secret_file: env_nonempty("PLANT_SECRET_FILE").map(PathBuf::from),
            fallback_token: env_nonempty("PLANT_FALLBACK_TOKEN"),
        }
    }
}

fn env_nonempty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// OAuth client credentials and API base URL from the secret store blob.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub auth_url: String,
    pub token_url: String,
    pub api_base_url: String,
}

impl Credentials {
    /// Read the secret blob. Call once per process lifetime.
    pub fn load(config: &AppConfig) -> Result<Self> {
        let path = config
            .secret_file
            .as_ref()
            .context("PLANT_SECRET_FILE is not set")?;
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read secret file {}", path.display()))?;
        let mut creds: Credentials =
            serde_json::from_str(&content).context("Failed to parse secret blob")?;
        if let Some(base) = &config.api_base_url {
            creds.api_base_url = base.clone();
        }
        Ok(creds)
    }
}
