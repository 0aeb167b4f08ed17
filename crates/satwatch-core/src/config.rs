//! Application configuration management.
//!
//! This module handles loading and saving the client configuration: the API
//! base URL, the HTTP timeout, which token store backend to use, and the last
//! email used to log in.
//!
//! Configuration is stored at `~/.config/satwatch/config.json`. The
//! `SATWATCH_API_URL` environment variable overrides the stored API URL.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::auth::{FileTokenStore, KeyringTokenStore, MemoryTokenStore, TokenStore};

/// Application name used for config/data directory paths
const APP_NAME: &str = "satwatch";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Token file name in the data directory
const TOKEN_FILE: &str = "tokens.json";

/// Environment variable overriding the API base URL
pub const API_URL_ENV: &str = "SATWATCH_API_URL";

/// Default versioned API base URL for a local backend
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api/v1";

/// HTTP request timeout in seconds.
/// Analysis runs can take a while server-side, so this is generous.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Which backend persists the access/refresh tokens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenStoreKind {
    /// Process memory only; the session ends with the process
    Memory,
    /// JSON file in the data directory
    #[default]
    File,
    /// OS keychain
    Keyring,
}

impl std::str::FromStr for TokenStoreKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(TokenStoreKind::Memory),
            "file" => Ok(TokenStoreKind::File),
            "keyring" => Ok(TokenStoreKind::Keyring),
            other => Err(anyhow::anyhow!("Unknown token store '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_url: Option<String>,
    pub request_timeout_secs: u64,
    pub token_store: TokenStoreKind,
    pub last_email: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            token_store: TokenStoreKind::default(),
            last_email: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&contents).context("Failed to parse config file")
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory for persisted tokens
    pub fn data_dir(&self) -> Result<PathBuf> {
        let data_dir = dirs::data_local_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }

    /// Directory for logs
    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    /// Resolve the API base URL: environment, then config file, then default.
    /// Trailing slashes are stripped so paths can be appended verbatim.
    pub fn api_base_url(&self) -> String {
        let url = std::env::var(API_URL_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .or_else(|| self.api_url.clone())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        url.trim().trim_end_matches('/').to_string()
    }

    /// Build the configured token store backend
    pub fn open_token_store(&self) -> Result<Arc<dyn TokenStore>> {
        let store: Arc<dyn TokenStore> = match self.token_store {
            TokenStoreKind::Memory => Arc::new(MemoryTokenStore::new()),
            TokenStoreKind::File => {
                let path = self.data_dir()?.join(TOKEN_FILE);
                Arc::new(FileTokenStore::open(path)?)
            }
            TokenStoreKind::Keyring => Arc::new(KeyringTokenStore::new()),
        };
        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
        assert_eq!(config.token_store, TokenStoreKind::File);
        assert!(config.last_email.is_none());
    }

    #[test]
    fn test_partial_config_file_uses_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"api_url": "https://watch.example.org/api/v1/"}"#)
                .expect("parse config");
        assert_eq!(config.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
        assert_eq!(config.token_store, TokenStoreKind::File);
        assert_eq!(config.api_url.as_deref(), Some("https://watch.example.org/api/v1/"));
    }

    #[test]
    fn test_token_store_kind_parsing() {
        assert_eq!("memory".parse::<TokenStoreKind>().ok(), Some(TokenStoreKind::Memory));
        assert_eq!("Keyring".parse::<TokenStoreKind>().ok(), Some(TokenStoreKind::Keyring));
        assert!("redis".parse::<TokenStoreKind>().is_err());

        let parsed: Config = serde_json::from_str(r#"{"token_store": "keyring"}"#).expect("parse");
        assert_eq!(parsed.token_store, TokenStoreKind::Keyring);
    }

    #[test]
    fn test_memory_store_from_config() {
        let config = Config {
            token_store: TokenStoreKind::Memory,
            ..Config::default()
        };
        let store = config.open_token_store().expect("open store");
        assert_eq!(store.get(crate::auth::TokenKind::Access), None);
    }
}
