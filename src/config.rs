//! Configuration management for GenieX
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from a YAML file, environment variables, and CLI
//! overrides.

use crate::cli::Cli;
use crate::error::{GeniexError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

/// Main configuration structure for GenieX
///
/// Holds everything the client needs: where the chat store service lives,
/// who the user is, and per-chat defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Chat store service configuration
    #[serde(default)]
    pub store: StoreConfig,

    /// Identity configuration
    #[serde(default)]
    pub identity: IdentityConfig,

    /// Chat behavior configuration
    #[serde(default)]
    pub chat: ChatConfig,
}

/// Chat store service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Base URL of the chat store service
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bearer token attached to every store request when set
    #[serde(default)]
    pub bearer_token: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_base_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            bearer_token: None,
            timeout_seconds: default_timeout(),
        }
    }
}

/// Identity configuration
///
/// The subject is opaque; the client never interprets it. When unset, the
/// `GENIEX_USER_ID` environment variable is consulted at startup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// Authenticated-user subject from the identity provider
    #[serde(default)]
    pub user_id: Option<String>,
}

/// Chat behavior configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Language code sent with reply-generation requests
    #[serde(default = "default_language")]
    pub language: String,

    /// Folder assigned to newly created sessions
    #[serde(default = "default_folder")]
    pub default_folder: String,
}

fn default_language() -> String {
    "en".to_string()
}

fn default_folder() -> String {
    crate::session::DEFAULT_FOLDER.to_string()
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
            default_folder: default_folder(),
        }
    }
}

impl Config {
    /// Loads configuration from a YAML file and applies CLI overrides
    ///
    /// A missing file yields the defaults; a malformed file is an error.
    ///
    /// # Examples
    ///
    /// ```
    /// use geniex::cli::Cli;
    /// use geniex::config::Config;
    ///
    /// let config = Config::load("does/not/exist.yaml", &Cli::default()).unwrap();
    /// assert_eq!(config.store.base_url, "http://localhost:5000");
    /// ```
    pub fn load(path: impl AsRef<Path>, cli: &Cli) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let raw = std::fs::read_to_string(path)?;
            serde_yaml::from_str(&raw)
                .map_err(|e| GeniexError::Config(format!("{}: {}", path.display(), e)))?
        } else {
            tracing::debug!("No config file at {}, using defaults", path.display());
            Self::default()
        };

        if let Some(store_url) = &cli.store_url {
            config.store.base_url = store_url.clone();
        }
        if let Some(user) = &cli.user {
            config.identity.user_id = Some(user.clone());
        }

        Ok(config)
    }

    /// Validates the configuration, returning descriptive errors
    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.store.base_url)
            .map_err(|e| GeniexError::Config(format!("Invalid store base_url: {}", e)))?;
        if self.store.timeout_seconds == 0 {
            return Err(GeniexError::Config("timeout_seconds must be positive".into()).into());
        }
        if self.chat.language.trim().is_empty() {
            return Err(GeniexError::Config("language must not be empty".into()).into());
        }
        if self.chat.default_folder.trim().is_empty() {
            return Err(GeniexError::Config("default_folder must not be empty".into()).into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.store.base_url, "http://localhost:5000");
        assert_eq!(config.store.timeout_seconds, 30);
        assert_eq!(config.chat.language, "en");
        assert_eq!(config.chat.default_folder, "Default");
        assert!(config.identity.user_id.is_none());
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let config = Config::load("no/such/file.yaml", &Cli::default()).unwrap();
        assert_eq!(config.store.base_url, "http://localhost:5000");
    }

    #[test]
    fn test_load_parses_yaml_sections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(
            &path,
            "store:\n  base_url: https://store.example.com\n  bearer_token: secret\nchat:\n  language: hi\n",
        )
        .unwrap();

        let config = Config::load(&path, &Cli::default()).unwrap();
        assert_eq!(config.store.base_url, "https://store.example.com");
        assert_eq!(config.store.bearer_token.as_deref(), Some("secret"));
        assert_eq!(config.chat.language, "hi");
        assert_eq!(config.chat.default_folder, "Default");
    }

    #[test]
    fn test_load_rejects_malformed_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "store: [not a map").unwrap();
        assert!(Config::load(&path, &Cli::default()).is_err());
    }

    #[test]
    fn test_cli_overrides_store_url_and_user() {
        let cli = Cli {
            store_url: Some("http://127.0.0.1:9000".to_string()),
            user: Some("cli-user".to_string()),
            ..Cli::default()
        };
        let config = Config::load("no/such/file.yaml", &cli).unwrap();
        assert_eq!(config.store.base_url, "http://127.0.0.1:9000");
        assert_eq!(config.identity.user_id.as_deref(), Some("cli-user"));
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let mut config = Config::default();
        config.store.base_url = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = Config::default();
        config.store.timeout_seconds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_language() {
        let mut config = Config::default();
        config.chat.language = "  ".to_string();
        assert!(config.validate().is_err());
    }
}
