//! Settings command handlers.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use certdesk_core::gateway::Settings;
use certdesk_core::session::SessionStore;

use super::{ensure_authenticated, gateway_failure};
use crate::cli::SettingsCommands;

pub async fn run(store: &SessionStore, command: SettingsCommands) -> Result<()> {
    match command {
        SettingsCommands::Show => show(store).await,
        SettingsCommands::Apply { file } => apply(store, &file).await,
    }
}

pub async fn show(store: &SessionStore) -> Result<()> {
    ensure_authenticated(store).await?;

    let settings = store
        .gateway()
        .settings()
        .await
        .map_err(|e| gateway_failure(store, "Failed to fetch settings", e))?;

    let json =
        serde_json::to_string_pretty(&settings).context("Failed to render settings as JSON")?;
    println!("{json}");

    Ok(())
}

async fn apply(store: &SessionStore, file: &Path) -> Result<()> {
    ensure_authenticated(store).await?;

    let contents = fs::read_to_string(file)
        .with_context(|| format!("Failed to read settings from {}", file.display()))?;
    let settings: Settings = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse settings from {}", file.display()))?;

    store
        .gateway()
        .put_settings(&settings)
        .await
        .map_err(|e| gateway_failure(store, "Failed to update settings", e))?;

    println!("✓ Settings updated");
    Ok(())
}
