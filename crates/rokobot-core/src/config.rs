use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use crate::transport::DEFAULT_ENDPOINT;

const DEFAULT_PACING_MS: u64 = 100;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Chat completion endpoint (`POST`, streamed reply)
    pub endpoint: String,
    /// Base URL of the tweet feed shown in the audio folder
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    /// Pause between revealed reply deltas
    pub pacing_ms: u64,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_url: None,
            api_key: None,
            pacing_ms: DEFAULT_PACING_MS,
            log_level: "info".to_string(),
        }
    }

    /// Load the user's config file. Environment overrides are applied
    /// separately with [`Config::apply_env`].
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&config_content)
            .map_err(|e| anyhow!("Invalid config at {}: {}", path.display(), e))?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(path, config_content)?;
        Ok(())
    }

    /// `ROKOBOT_ENDPOINT`, `ROKOBOT_API_URL` and `ROKOBOT_API_KEY` win over
    /// the file.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(endpoint) = lookup("ROKOBOT_ENDPOINT") {
            self.endpoint = endpoint;
        }
        if let Some(api_url) = lookup("ROKOBOT_API_URL") {
            self.api_url = Some(api_url);
        }
        if let Some(api_key) = lookup("ROKOBOT_API_KEY") {
            self.api_key = Some(api_key);
        }
    }

    pub fn pacing(&self) -> Duration {
        Duration::from_millis(self.pacing_ms)
    }

    /// Directory holding the config file and the log.
    pub fn data_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("rokobot"))
    }

    fn get_config_path() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::new());
        assert_eq!(config.pacing(), Duration::from_millis(100));
        assert_eq!(config.endpoint, "http://localhost:3000/api/createMessage");
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = Config::new();
        config.api_url = Some("https://feed.example".to_string());
        config.pacing_ms = 40;
        config.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "pacing_ms": 0 }"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.pacing_ms, 0);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.api_key, None);
    }

    #[test]
    fn test_invalid_file_is_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "not json").unwrap();

        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_env_overrides_file() {
        let mut config = Config::new();
        config.apply_env(|key| match key {
            "ROKOBOT_ENDPOINT" => Some("http://basilisk:8080/api/createMessage".to_string()),
            "ROKOBOT_API_KEY" => Some("secret".to_string()),
            _ => None,
        });

        assert_eq!(config.endpoint, "http://basilisk:8080/api/createMessage");
        assert_eq!(config.api_key.as_deref(), Some("secret"));
        assert_eq!(config.api_url, None);
    }
}
