//! Durable session storage.
//!
//! Stores the authenticated marker and bearer token in
//! `${CERTDESK_HOME}/session.json` with restricted permissions (0600).
//! Tokens are never logged or displayed in full.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::paths;

/// Session cache filename.
const SESSION_CACHE_FILE: &str = "session.json";

/// Persisted session state.
///
/// Written iff the session is authenticated; removed on logout. The session
/// store is the only writer.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionCache {
    /// The durable "is authenticated" marker.
    pub authenticated: bool,
    /// The opaque bearer token, when one was issued.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl SessionCache {
    /// Returns the default path of the session cache file.
    pub fn cache_path() -> PathBuf {
        paths::certdesk_home().join(SESSION_CACHE_FILE)
    }

    /// Loads the session cache from a path.
    /// Returns an empty cache if the file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read session cache from {}", path.display()))?;

        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse session cache from {}", path.display()))
    }

    /// Saves the session cache with restricted permissions (0600).
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let contents =
            serde_json::to_string_pretty(self).context("Failed to serialize session cache")?;

        // Write with restricted permissions
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .mode(0o600)
                .open(path)
                .with_context(|| format!("Failed to open {} for writing", path.display()))?;
            file.write_all(contents.as_bytes())
                .with_context(|| format!("Failed to write to {}", path.display()))?;
        }

        #[cfg(not(unix))]
        {
            fs::write(path, contents)
                .with_context(|| format!("Failed to write to {}", path.display()))?;
        }

        Ok(())
    }

    /// Removes the session cache file. Returns whether one existed.
    pub fn clear_at(path: &Path) -> Result<bool> {
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(path)
            .with_context(|| format!("Failed to remove session cache at {}", path.display()))?;
        Ok(true)
    }
}

/// Returns a masked version of a token for display (first 8 chars + ...).
pub fn mask_token(token: &str) -> String {
    if token.len() <= 12 {
        return "***".to_string();
    }
    format!("{}...", &token[..8])
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    /// Test: serialization roundtrip (in-memory, no fs).
    #[test]
    fn test_cache_serialization() {
        let cache = SessionCache {
            authenticated: true,
            token: Some("tok-12345".to_string()),
        };

        let json = serde_json::to_string(&cache).unwrap();
        let loaded: SessionCache = serde_json::from_str(&json).unwrap();

        assert!(loaded.authenticated);
        assert_eq!(loaded.token.as_deref(), Some("tok-12345"));
    }

    /// Test: missing file loads as the empty cache.
    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let cache = SessionCache::load_from(&dir.path().join("session.json")).unwrap();
        assert!(!cache.authenticated);
        assert!(cache.token.is_none());
    }

    /// Test: save then load round-trips through disk.
    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");

        let cache = SessionCache {
            authenticated: true,
            token: Some("tok-abcdef".to_string()),
        };
        cache.save_to(&path).unwrap();

        let loaded = SessionCache::load_from(&path).unwrap();
        assert_eq!(loaded, cache);
    }

    /// Test: clear removes the file and reports whether one existed.
    #[test]
    fn test_clear() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");

        assert!(!SessionCache::clear_at(&path).unwrap());

        SessionCache::default().save_to(&path).unwrap();
        assert!(SessionCache::clear_at(&path).unwrap());
        assert!(!path.exists());
    }

    /// Test: cache file has restricted permissions on Unix.
    #[cfg(unix)]
    #[test]
    fn test_cache_file_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");

        SessionCache {
            authenticated: true,
            token: Some("tok".to_string()),
        }
        .save_to(&path)
        .unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    /// Test: token masking never reveals short tokens.
    #[test]
    fn test_mask_token() {
        assert_eq!(mask_token("tok-abcdefghijklmnop"), "tok-abcd...");
        assert_eq!(mask_token("short"), "***");
    }
}
