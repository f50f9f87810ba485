// Tunegrab - Playlist-aware music downloader
// Copyright (C) 2026 Tunegrab contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.


//! Configuration persistence
//!
//! A single `config.json` under the per-user application directory holds the
//! catalog credentials and the download root. A missing file is not an
//! error; it loads as defaults so first-run flows work without setup.

use crate::error::{Result, TunegrabError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application directory name under the platform config dir
const APP_DIR_NAME: &str = "tunegrab";

/// Config file name inside the application directory
const CONFIG_FILE_NAME: &str = "config.json";

/// Persisted user configuration
///
/// Empty strings mean "unset"; listing operations treat an unset download
/// path as an empty library rather than an error.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    #[serde(default)]
    pub download_path: String,
}

impl Config {
    /// Download root as a path, `None` when unset
    pub fn download_root(&self) -> Option<PathBuf> {
        if self.download_path.is_empty() {
            None
        } else {
            Some(PathBuf::from(&self.download_path))
        }
    }

    /// Whether catalog credentials are present
    pub fn has_credentials(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.is_empty()
    }
}

/// Loads and saves the config file
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    /// Store rooted at the per-user application directory
    ///
    /// Creates the directory if it does not exist yet.
    pub fn open_default() -> Result<Self> {
        let app_dir = app_dir()?;
        std::fs::create_dir_all(&app_dir).map_err(|e| {
            TunegrabError::FileIoError(format!("create {}: {}", app_dir.display(), e))
        })?;
        Ok(Self {
            path: app_dir.join(CONFIG_FILE_NAME),
        })
    }

    /// Store backed by an explicit file path (used by tests)
    pub fn at_path<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the config, falling back to defaults when the file is absent
    pub fn load(&self) -> Result<Config> {
        match std::fs::read_to_string(&self.path) {
            Ok(data) => Ok(serde_json::from_str(&data)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Config::default()),
            Err(e) => Err(TunegrabError::FileIoError(format!(
                "read {}: {}",
                self.path.display(),
                e
            ))),
        }
    }

    /// Persist the config as pretty-printed JSON
    pub fn save(&self, config: &Config) -> Result<()> {
        let data = serde_json::to_string_pretty(config)?;
        std::fs::write(&self.path, data).map_err(|e| {
            TunegrabError::FileIoError(format!("write {}: {}", self.path.display(), e))
        })
    }
}

/// Per-user application directory
pub fn app_dir() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR_NAME))
        .ok_or_else(|| {
            TunegrabError::ConfigurationError("no user config directory on this platform".into())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_loads_defaults() {
        let dir = TempDir::new().unwrap();
        let store = ConfigStore::at_path(dir.path().join("config.json"));
        let config = store.load().unwrap();
        assert_eq!(config, Config::default());
        assert!(config.download_root().is_none());
        assert!(!config.has_credentials());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = TempDir::new().unwrap();
        let store = ConfigStore::at_path(dir.path().join("config.json"));

        let config = Config {
            client_id: "abc".into(),
            client_secret: "shh".into(),
            download_path: "/music".into(),
        };
        store.save(&config).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.download_root().unwrap(), PathBuf::from("/music"));
        assert!(loaded.has_credentials());
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"client_id":"x","legacy_key":true}"#).unwrap();

        let config = ConfigStore::at_path(&path).load().unwrap();
        assert_eq!(config.client_id, "x");
        assert!(config.client_secret.is_empty());
    }
}
