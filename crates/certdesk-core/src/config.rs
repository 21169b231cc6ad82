//! Configuration management for certdesk.
//!
//! Loads configuration from ${CERTDESK_HOME}/config.toml with sensible defaults.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Default config template with comments, embedded at compile time.
const DEFAULT_CONFIG_TEMPLATE: &str = include_str!("default_config.toml");

pub mod paths {
    //! Path resolution for certdesk configuration and data directories.
    //!
    //! CERTDESK_HOME resolution order:
    //! 1. CERTDESK_HOME environment variable (if set)
    //! 2. ~/.config/certdesk (default)

    use std::path::PathBuf;

    /// Returns the certdesk home directory.
    ///
    /// Checks CERTDESK_HOME env var first, falls back to ~/.config/certdesk
    pub fn certdesk_home() -> PathBuf {
        if let Ok(home) = std::env::var("CERTDESK_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir()
            .map(|h| h.join(".config").join("certdesk"))
            .expect("Could not determine home directory")
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        certdesk_home().join("config.toml")
    }

    /// Returns the path to the persisted session cache.
    pub fn session_path() -> PathBuf {
        certdesk_home().join("session.json")
    }

    /// Returns the directory log files are written to.
    pub fn logs_dir() -> PathBuf {
        certdesk_home().join("logs")
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the certificate-management backend
    pub server_url: String,

    /// Timeout in seconds for session re-hydration at startup
    pub hydrate_timeout_secs: u64,
}

impl Config {
    const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:3737";
    const DEFAULT_HYDRATE_TIMEOUT_SECS: u64 = 10;

    /// Loads configuration from the default config path.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Returns the hydration timeout as a duration.
    pub fn hydrate_timeout(&self) -> Duration {
        Duration::from_secs(self.hydrate_timeout_secs)
    }

    /// Saves only the server_url field to the config file.
    ///
    /// Creates the file if it doesn't exist.
    /// Preserves existing fields and comments using toml_edit.
    pub fn save_server_url(url: &str) -> Result<()> {
        Self::save_server_url_to(&paths::config_path(), url)
    }

    /// Saves only the server_url field to a specific config file path.
    ///
    /// Creates the file with the default template if it doesn't exist.
    /// Preserves existing fields and comments using toml_edit.
    pub fn save_server_url_to(path: &Path, url: &str) -> Result<()> {
        use toml_edit::{DocumentMut, value};

        // Read existing file or use default template
        let contents = if path.exists() {
            fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?
        } else {
            DEFAULT_CONFIG_TEMPLATE.to_string()
        };

        // Parse as editable document (preserves comments and formatting)
        let mut doc: DocumentMut = contents
            .parse()
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;

        doc["server_url"] = value(url);

        Self::write_config(path, &doc.to_string())
    }

    /// Creates a default config file at the given path.
    /// Returns an error if the file already exists.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }

        Self::write_config(path, DEFAULT_CONFIG_TEMPLATE)
    }

    /// Writes config content to a file, creating parent directories as needed.
    /// Uses atomic write (temp file + rename) to prevent corruption.
    fn write_config(path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let tmp_path = path.with_extension("toml.tmp");
        fs::write(&tmp_path, content)
            .with_context(|| format!("Failed to write config to {}", tmp_path.display()))?;
        fs::rename(&tmp_path, path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                tmp_path.display(),
                path.display()
            )
        })?;

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: Self::DEFAULT_SERVER_URL.to_string(),
            hydrate_timeout_secs: Self::DEFAULT_HYDRATE_TIMEOUT_SECS,
        }
    }
}
