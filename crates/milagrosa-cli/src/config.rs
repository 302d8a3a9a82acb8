//! CLI configuration.
//!
//! Reads/writes `~/.milagrosa/config.toml`. Every field is optional in
//! the file; missing fields take the library defaults.

use std::path::{Path, PathBuf};

use milagrosa_auth::AuthConfig;
use milagrosa_client::ClientConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// API root (e.g. "http://localhost:8080/api/v1").
    pub server: String,
    pub request_timeout_secs: u64,
    pub login_timeout_secs: u64,
    pub enforce_expiry: bool,
    pub expiry_leeway_secs: i64,
    /// Where the token and cached session are kept between runs.
    /// Defaults to `session.json` next to the config file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_file: Option<PathBuf>,
}

impl Default for CliConfig {
    fn default() -> Self {
        let client = ClientConfig::default();
        let auth = AuthConfig::default();
        Self {
            server: client.base_url,
            request_timeout_secs: client.request_timeout_secs,
            login_timeout_secs: auth.login_timeout_secs,
            enforce_expiry: auth.enforce_expiry,
            expiry_leeway_secs: auth.expiry_leeway_secs,
            session_file: None,
        }
    }
}

impl CliConfig {
    /// Default config file path: ~/.milagrosa/config.toml.
    pub fn default_path() -> PathBuf {
        dirs_path().join("config.toml")
    }

    /// Load config from disk, or return default if file doesn't exist.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: CliConfig = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("invalid config {}: {e}", path.display()))?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn session_path(&self, config_path: &Path) -> PathBuf {
        match &self.session_file {
            Some(path) => path.clone(),
            None => config_path
                .parent()
                .map(|dir| dir.join("session.json"))
                .unwrap_or_else(|| PathBuf::from("session.json")),
        }
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.server.clone(),
            request_timeout_secs: self.request_timeout_secs,
            ..Default::default()
        }
    }

    pub fn auth_config(&self) -> AuthConfig {
        AuthConfig {
            login_timeout_secs: self.login_timeout_secs,
            enforce_expiry: self.enforce_expiry,
            expiry_leeway_secs: self.expiry_leeway_secs,
            ..Default::default()
        }
    }
}

/// Return the config directory (~/.milagrosa).
fn dirs_path() -> PathBuf {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".milagrosa")
}
