//! Configuration loading for tracking services
//!
//! Fitbit OAuth credentials are loaded from (in order of priority):
//! 1. Compile-time embedded credentials (for personal release builds)
//! 2. JSON file in the Daybook config directory
//! 3. Runtime environment variables (fallback)
//!
//! Sync settings come from an optional `settings.json`; every field has a
//! default so the file may be partial or absent.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::sync::SyncOptions;

/// Credentials filename in the Daybook config directory
const CREDENTIALS_FILE: &str = "fitbit-credentials.json";

/// Settings filename in the Daybook config directory
const SETTINGS_FILE: &str = "settings.json";

/// Default database filename in the Daybook data directory
const DATABASE_FILE: &str = "daybook.sqlite";

/// Redirect URI registered for the Fitbit app when none is configured
pub const DEFAULT_REDIRECT_URI: &str = "http://localhost:8080/callback";

/// OAuth credentials for Fitbit Web API access
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FitbitCredentials {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_redirect_uri")]
    pub redirect_uri: String,
}

fn default_redirect_uri() -> String {
    DEFAULT_REDIRECT_URI.to_string()
}

impl FitbitCredentials {
    /// Load credentials using the following priority:
    /// 1. Compile-time embedded credentials
    /// 2. JSON file (~/.config/daybook/fitbit-credentials.json)
    /// 3. Runtime environment variables
    pub fn load() -> Result<Self> {
        if let Some(creds) = Self::from_compile_time() {
            return Ok(creds);
        }

        if config::config_exists(CREDENTIALS_FILE) {
            return config::load_json(CREDENTIALS_FILE);
        }

        Self::from_env()
    }

    /// Load credentials embedded at compile time via environment variables.
    /// Build with: FITBIT_CLIENT_ID=xxx FITBIT_CLIENT_SECRET=yyy cargo build --release
    pub fn from_compile_time() -> Option<Self> {
        let client_id = option_env!("FITBIT_CLIENT_ID")?;
        let client_secret = option_env!("FITBIT_CLIENT_SECRET")?;

        if client_id.is_empty() || client_secret.is_empty() {
            return None;
        }

        Some(Self {
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            redirect_uri: option_env!("FITBIT_REDIRECT_URI")
                .map(str::to_string)
                .unwrap_or_else(default_redirect_uri),
        })
    }

    /// Load credentials from a specific JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        config::load_json_file(path)
    }

    /// Parse credentials from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse credentials JSON")
    }

    /// Load credentials from environment variables
    pub fn from_env() -> Result<Self> {
        let client_id = std::env::var("FITBIT_CLIENT_ID")
            .context("FITBIT_CLIENT_ID environment variable not set")?;
        let client_secret = std::env::var("FITBIT_CLIENT_SECRET")
            .context("FITBIT_CLIENT_SECRET environment variable not set")?;
        let redirect_uri =
            std::env::var("FITBIT_REDIRECT_URI").unwrap_or_else(|_| default_redirect_uri());

        Ok(Self {
            client_id,
            client_secret,
            redirect_uri,
        })
    }

    /// Get the default credentials file path (~/.config/daybook/fitbit-credentials.json)
    pub fn default_credentials_path() -> Option<PathBuf> {
        config::config_path(CREDENTIALS_FILE)
    }

    /// Check if credentials are available (compile-time, file, or env vars)
    pub fn is_available() -> bool {
        if Self::from_compile_time().is_some() {
            return true;
        }
        if config::config_exists(CREDENTIALS_FILE) {
            return true;
        }
        std::env::var("FITBIT_CLIENT_ID").is_ok() && std::env::var("FITBIT_CLIENT_SECRET").is_ok()
    }
}

/// User-tunable sync and storage settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncSettings {
    /// Pause between consecutive dates of a range sync
    pub request_delay_ms: u64,
    /// Attempts per Fitbit request before giving up
    pub max_retries: u32,
    /// SQLite database file; defaults to the Daybook data directory
    pub database_path: Option<PathBuf>,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            request_delay_ms: 100,
            max_retries: 3,
            database_path: None,
        }
    }
}

impl SyncSettings {
    /// Load settings from ~/.config/daybook/settings.json, or defaults if absent
    pub fn load() -> Result<Self> {
        if config::config_exists(SETTINGS_FILE) {
            config::load_json(SETTINGS_FILE)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse settings from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse settings JSON")
    }

    /// Resolve the database path, falling back to the data directory
    pub fn database_path(&self) -> Result<PathBuf> {
        match &self.database_path {
            Some(path) => Ok(path.clone()),
            None => config::data_path(DATABASE_FILE).context("Could not determine data directory"),
        }
    }

    pub fn sync_options(&self) -> SyncOptions {
        SyncOptions {
            request_delay: Duration::from_millis(self.request_delay_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_credentials() {
        let json = r#"{
            "client_id": "23ABCD",
            "client_secret": "s3cret",
            "redirect_uri": "http://localhost:5173/callback"
        }"#;

        let creds = FitbitCredentials::from_json(json).unwrap();
        assert_eq!(creds.client_id, "23ABCD");
        assert_eq!(creds.client_secret, "s3cret");
        assert_eq!(creds.redirect_uri, "http://localhost:5173/callback");
    }

    #[test]
    fn test_credentials_default_redirect() {
        let json = r#"{ "client_id": "23ABCD", "client_secret": "s3cret" }"#;
        let creds = FitbitCredentials::from_json(json).unwrap();
        assert_eq!(creds.redirect_uri, DEFAULT_REDIRECT_URI);
    }

    #[test]
    fn test_invalid_credentials() {
        let json = r#"{ "client_id": "only-id" }"#;
        assert!(FitbitCredentials::from_json(json).is_err());
    }

    #[test]
    fn test_partial_settings() {
        let settings = SyncSettings::from_json(r#"{ "request_delay_ms": 250 }"#).unwrap();
        assert_eq!(settings.request_delay_ms, 250);
        assert_eq!(settings.max_retries, 3);
        assert_eq!(
            settings.sync_options().request_delay,
            Duration::from_millis(250)
        );
    }

    #[test]
    fn test_settings_database_override() {
        let settings =
            SyncSettings::from_json(r#"{ "database_path": "/tmp/daybook.sqlite" }"#).unwrap();
        assert_eq!(
            settings.database_path().unwrap(),
            PathBuf::from("/tmp/daybook.sqlite")
        );
    }
}
