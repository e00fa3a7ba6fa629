//! Client configuration.
//!
//! Stored at `<config_dir>/farm-portal/config.json`. A missing file yields
//! the defaults: the local backend and a session file under the user's data
//! directory.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::client::DEFAULT_BASE_URL;
use crate::error::ApiError;

/// Application name used for config/data directory paths
const APP_NAME: &str = "farm-portal";

const CONFIG_FILE: &str = "config.json";

const SESSION_FILE: &str = "session.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_session_file")]
    pub session_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            session_file: default_session_file(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_session_file() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_NAME)
        .join(SESSION_FILE)
}

impl Config {
    /// Load from the user's config directory, or defaults if absent.
    pub fn load() -> Result<Self, ApiError> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| ApiError::Config("could not find config directory".to_string()))?;
        Self::from_path(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ApiError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ApiError::Config(format!("failed to read {}: {e}", path.display())))?;
        serde_json::from_str(&contents)
            .map_err(|e| ApiError::Config(format!("failed to parse {}: {e}", path.display())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::from_path(dir.path().join("config.json")).unwrap();
        assert_eq!(config.base_url, "http://localhost:8000");
        assert!(config.session_file.ends_with("farm-portal/session.json"));
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"base_url":"http://portal.example:9000"}"#).unwrap();

        let config = Config::from_path(&path).unwrap();
        assert_eq!(config.base_url, "http://portal.example:9000");
        assert_eq!(config.session_file, Config::default().session_file);
    }

    #[test]
    fn malformed_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "base_url = 1").unwrap();
        assert!(matches!(Config::from_path(&path), Err(ApiError::Config(_))));
    }
}
