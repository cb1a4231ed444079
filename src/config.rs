use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Result, anyhow};

pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Environment variable that overrides the configured backend URL.
pub const API_URL_ENV: &str = "DOCMIND_API_URL";

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Config {
    pub api_url: Option<String>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    /// Persist a backend URL as the new default.
    pub fn save_api_url(url: &str) -> Result<()> {
        let mut config = Self::load().unwrap_or_else(|_| Self::new());
        config.api_url = Some(url.to_string());
        config.save()
    }

    /// Resolve the effective backend base URL. Precedence: CLI flag, then
    /// the environment variable, then the config file, then the default.
    /// An empty string at any source counts as unset and falls through to
    /// the next one.
    pub fn resolve_api_url(&self, cli_override: Option<&str>) -> String {
        self.resolve_from(cli_override, std::env::var(API_URL_ENV).ok())
    }

    fn resolve_from(&self, cli_override: Option<&str>, env_url: Option<String>) -> String {
        non_empty(cli_override.map(str::to_string))
            .or_else(|| non_empty(env_url))
            .or_else(|| non_empty(self.api_url.clone()))
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
    }

    fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    fn save_to(&self, path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("docmind").join("config.json"))
    }
}

fn non_empty(url: Option<String>) -> Option<String> {
    url.filter(|url| !url.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = Config {
            api_url: Some("https://docs.example.com".to_string()),
        };
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.api_url.as_deref(), Some("https://docs.example.com"));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = Config::load_from(&dir.path().join("absent.json")).unwrap();
        assert!(loaded.api_url.is_none());
    }

    #[test]
    fn cli_override_beats_env_and_config() {
        let config = Config {
            api_url: Some("http://from-config:9000".to_string()),
        };
        assert_eq!(
            config.resolve_from(
                Some("http://from-cli:7000"),
                Some("http://from-env:8000".to_string())
            ),
            "http://from-cli:7000"
        );
    }

    #[test]
    fn env_var_beats_config_value() {
        let config = Config {
            api_url: Some("http://from-config:9000".to_string()),
        };
        assert_eq!(
            config.resolve_from(None, Some("http://from-env:8000".to_string())),
            "http://from-env:8000"
        );
    }

    #[test]
    fn unset_everything_falls_back_to_default() {
        let config = Config::new();
        assert_eq!(config.resolve_from(None, None), DEFAULT_API_URL);
    }

    #[test]
    fn empty_config_value_counts_as_unset() {
        let config = Config {
            api_url: Some(String::new()),
        };
        assert_eq!(config.resolve_from(None, None), DEFAULT_API_URL);
    }

    #[test]
    fn empty_env_var_falls_through_to_config() {
        let config = Config {
            api_url: Some("http://from-config:9000".to_string()),
        };
        assert_eq!(
            config.resolve_from(None, Some(String::new())),
            "http://from-config:9000"
        );
    }

    #[test]
    fn empty_cli_flag_falls_through_to_env() {
        let config = Config::new();
        assert_eq!(
            config.resolve_from(Some("  "), Some("http://from-env:8000".to_string())),
            "http://from-env:8000"
        );
    }
}
