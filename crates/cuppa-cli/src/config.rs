//! Persisted configuration: API URL, session tokens, order limits.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use cuppa_core::{ApiUrl, CredentialState};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

const DEFAULT_API_URL: &str = "https://api.cuppalabs.com";

/// Stored configuration. Every field has a default so a partial or missing
/// file still loads.
#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_url: String,

    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: Option<String>,
    pub refresh_token_expires_at: Option<String>,

    /// Order quantity bounds in whole kilograms per month.
    pub min_quantity_kg: u32,
    pub max_quantity_kg: u32,

    /// Payment polling cadence and cutoff.
    pub poll_interval_secs: u64,
    pub payment_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            access_token: String::new(),
            refresh_token: String::new(),
            expires_at: None,
            refresh_token_expires_at: None,
            min_quantity_kg: 1,
            max_quantity_kg: 10,
            poll_interval_secs: 5,
            payment_timeout_secs: 300,
        }
    }
}

impl Config {
    /// Load from the platform config directory; defaults when no file
    /// exists yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let json = fs::read_to_string(path).context("Failed to read config file")?;
        serde_json::from_str(&json).context("Invalid config file")
    }

    /// Save to the platform config directory with owner-only permissions
    /// (the file holds tokens).
    pub fn save(&self) -> Result<()> {
        self.save_to(&config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, &json).context("Failed to write config file")?;

        #[cfg(unix)]
        {
            let mut perms = fs::metadata(path)?.permissions();
            perms.set_mode(0o600);
            fs::set_permissions(path, perms)?;
        }

        Ok(())
    }

    /// The API base URL, with `CUPPA_API_URL` taking precedence over the
    /// stored value.
    pub fn api_url(&self) -> Result<ApiUrl> {
        let raw = std::env::var("CUPPA_API_URL").unwrap_or_else(|_| self.api_url.clone());
        ApiUrl::new(&raw).context("Invalid API URL")
    }

    /// Credential state restored from the stored token fields.
    pub fn credentials(&self) -> CredentialState {
        CredentialState::from_parts(
            &self.access_token,
            &self.refresh_token,
            self.expires_at.clone(),
            self.refresh_token_expires_at.clone(),
        )
    }

    /// Write a (possibly rotated) credential state back into the stored
    /// fields.
    pub fn set_credentials(&mut self, credentials: &CredentialState) {
        self.access_token = credentials.access_token().to_string();
        self.refresh_token = credentials.refresh_token().to_string();
        self.expires_at = credentials.access_token_expires_at().map(str::to_string);
        self.refresh_token_expires_at = credentials
            .refresh_token_expires_at()
            .map(str::to_string);
    }
}

/// Get the config file path.
fn config_path() -> Result<PathBuf> {
    let dirs =
        ProjectDirs::from("", "", "cuppa").context("Could not determine config directory")?;
    Ok(dirs.config_dir().join("config.json"))
}
