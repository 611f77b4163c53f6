//! Plant Ranger Check - voice-skill backend
//!
//! Reads a structured skill event, resolves the user's credentials, calls
//! the gardening-status API, and prints the spoken/card response.

mod api;
mod auth;
mod config;
mod event;
mod response;
mod skill;

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api::GardenClient;
use crate::auth::FileTokenStore;
use crate::config::{AppConfig, Credentials};
use crate::event::SkillEvent;
use crate::skill::SkillContext;

#[derive(Parser)]
#[command(name = "plant-ranger")]
#[command(about = "Voice-skill backend for Plant Ranger garden status checks", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Handle one skill event: read the JSON envelope, print the response
    Handle {
        /// Event JSON file; reads stdin when omitted
        #[arg(short, long)]
        event: Option<PathBuf>,
    },

    /// Show stored token records
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging on stderr; stdout carries the response JSON
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let app_config = AppConfig::from_env();

    match cli.command {
        Commands::Handle { event } => handle(&app_config, event).await?,
        Commands::Status => status(&app_config)?,
    }

    Ok(())
}

fn token_store(app_config: &AppConfig) -> Result<FileTokenStore> {
    let path = match &app_config.token_store_path {
        Some(path) => path.clone(),
        None => FileTokenStore::default_path()?,
    };
    Ok(FileTokenStore::new(path))
}

async fn handle(app_config: &AppConfig, event_path: Option<PathBuf>) -> Result<()> {
    let raw = match event_path {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read event file {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read event from stdin")?;
            buf
        }
    };
    let event: SkillEvent = serde_json::from_str(&raw).context("Failed to parse skill event")?;

    // Credentials load once per process; a missing secret file only
    // matters if a token refresh is actually attempted.
    let creds = match Credentials::load(app_config) {
        Ok(creds) => Some(creds),
        Err(e) => {
            tracing::debug!("No credentials loaded: {:#}", e);
            None
        }
    };

    let base_url = app_config
        .api_base_url
        .clone()
        .or_else(|| creds.as_ref().map(|c| c.api_base_url.clone()))
        .context("No API base URL: set PLANT_API_BASE_URL or provide a secret blob")?;

    let client = GardenClient::new(&base_url)?;
    let store = token_store(app_config)?;
    let ctx = SkillContext {
        client: &client,
        store: &store,
        creds: creds.as_ref(),
        fallback_token: app_config.fallback_token.as_deref(),
    };

    let resp = skill::handle_event(&ctx, &event).await;
    println!("{}", serde_json::to_string_pretty(&resp)?);
    Ok(())
}

fn status(app_config: &AppConfig) -> Result<()> {
    let store = token_store(app_config)?;
    let records = store.list()?;

    if records.is_empty() {
        println!("No stored tokens.");
        return Ok(());
    }

    for rec in records {
        let state = if rec.is_expired() { "expired" } else { "valid" };
        let refresh = if rec.refresh_token.is_some() {
            "refresh token present"
        } else {
            "no refresh token"
        };
        println!(
            "{} [{}]: {} ({})",
            rec.user_id,
            rec.kind.as_str(),
            state,
            refresh
        );
        if let Some(exp) = rec.expires_at {
            println!("  expires_at: {}", exp);
        }
    }

    Ok(())
}
