//! Config command handlers.

use anyhow::{Context, Result};
use certdesk_core::config::{self, Config};

use crate::cli::ConfigCommands;

pub fn run(command: &ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Path => {
            path();
            Ok(())
        }
        ConfigCommands::Init => init(),
        ConfigCommands::SetServer { url } => set_server(url),
    }
}

fn path() {
    println!("{}", config::paths::config_path().display());
}

fn init() -> Result<()> {
    let config_path = config::paths::config_path();
    Config::init(&config_path)
        .with_context(|| format!("init config at {}", config_path.display()))?;
    println!("Created config at {}", config_path.display());
    Ok(())
}

fn set_server(url: &str) -> Result<()> {
    let config_path = config::paths::config_path();
    Config::save_server_url_to(&config_path, url)
        .with_context(|| format!("update config at {}", config_path.display()))?;
    println!("Set server_url to {url}");
    Ok(())
}
