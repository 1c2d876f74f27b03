//! Persisted local preferences
//!
//! The only client-side durable state is a single `theme` key, stored as a
//! small JSON file in the platform data directory. `GENIEX_PREFS_PATH`
//! overrides the location so tests can point at a temporary file.

use crate::error::{GeniexError, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Display theme preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Light theme (default)
    #[default]
    Light,
    /// Dark theme
    Dark,
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Light => write!(f, "light"),
            Self::Dark => write!(f, "dark"),
        }
    }
}

impl Theme {
    /// Parses a theme name, case-insensitively
    pub fn parse_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            other => Err(GeniexError::Preferences(format!("Unknown theme: {}", other)).into()),
        }
    }
}

/// Client-side preferences
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Preferences {
    /// Display theme
    #[serde(default)]
    pub theme: Theme,
}

impl Preferences {
    /// Loads preferences, returning defaults when no file exists yet
    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(&path)
            .map_err(|e| GeniexError::Preferences(format!("Failed to read {}: {}", path.display(), e)))?;
        let prefs = serde_json::from_str(&raw)
            .map_err(|e| GeniexError::Preferences(format!("Malformed preferences file: {}", e)))?;
        Ok(prefs)
    }

    /// Writes preferences to disk, creating parent directories as needed
    pub fn save(&self) -> Result<()> {
        let path = Self::path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                GeniexError::Preferences(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }
        let raw = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, raw)
            .map_err(|e| GeniexError::Preferences(format!("Failed to write {}: {}", path.display(), e)))?;
        Ok(())
    }

    /// Resolves the preferences file location
    ///
    /// Honors the `GENIEX_PREFS_PATH` environment override, otherwise the
    /// platform data directory.
    pub fn path() -> Result<PathBuf> {
        if let Ok(override_path) = std::env::var("GENIEX_PREFS_PATH") {
            return Ok(PathBuf::from(override_path));
        }

        let proj_dirs = ProjectDirs::from("com", "geniex", "geniex")
            .ok_or_else(|| GeniexError::Preferences("Could not determine data directory".into()))?;
        Ok(proj_dirs.data_dir().join("preferences.json"))
    }
}
