use eyre::{Context, Result, eyre};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use egov_laws_mcp::api::DEFAULT_BASE_URL;

/// Environment variable that replaces `api.base_url`
pub const BASE_URL_ENV: &str = "EGOV_LAWS_BASE_URL";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log_level: Option<String>,
    pub api: ApiConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_ms: u64,
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_ms: 30000,
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub name: String,
    pub instructions: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME").to_string(),
            instructions: Some(
                "e-Gov法令API v2 を利用して日本の法令を検索・取得します。\
                 法令の特定には list_laws / search_laws で law_id を調べてから get_law を使ってください。"
                    .to_string(),
            ),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: Some("info".to_string()),
            api: ApiConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration with fallback chain, then apply environment overrides
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        let mut config = Self::load_file(config_path)?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    fn load_file(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        let project_name = env!("CARGO_PKG_NAME");

        // Try primary location: ~/.config/<project>/<project>.yml
        if let Some(config_dir) = dirs::config_dir() {
            let primary_config = config_dir.join(project_name).join(format!("{}.yml", project_name));
            if primary_config.exists() {
                match Self::load_from_file(&primary_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        log::warn!("Failed to load config from {}: {}", primary_config.display(), e);
                    }
                }
            }
        }

        // Try fallback location: ./<project>.yml
        let fallback_config = PathBuf::from(format!("{}.yml", project_name));
        if fallback_config.exists() {
            match Self::load_from_file(&fallback_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    log::warn!("Failed to load config from {}: {}", fallback_config.display(), e);
                }
            }
        }

        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        log::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Apply environment overrides using `lookup` to read variables
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(BASE_URL_ENV).filter(|u| !u.trim().is_empty()) {
            log::info!("Using base URL from {}: {}", BASE_URL_ENV, url);
            self.api.base_url = url;
        }
    }

    /// Apply command-line overrides, which win over file and environment
    pub fn apply_cli(&mut self, base_url: Option<&str>, timeout_ms: Option<u64>) {
        if let Some(url) = base_url {
            self.api.base_url = url.to_string();
        }
        if let Some(ms) = timeout_ms {
            self.api.timeout_ms = ms;
        }
    }

    /// Reject settings no request could succeed with
    pub fn validate(&self) -> Result<()> {
        if self.api.timeout_ms == 0 {
            return Err(eyre!("api.timeout_ms must be greater than zero"));
        }
        if self.api.base_url.trim().is_empty() {
            return Err(eyre!("api.base_url must not be empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.log_level.as_deref(), Some("info"));
        assert_eq!(config.api.base_url, "https://elaws.e-gov.go.jp/api/2");
        assert_eq!(config.api.timeout(), Duration::from_secs(30));
        assert!(config.api.user_agent.starts_with("egov-laws-mcp/"));
        assert_eq!(config.server.name, "egov-laws-mcp");
        assert!(config.server.instructions.is_some());
    }

    #[test]
    fn test_load_explicit_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "log_level: debug\napi:\n  timeout_ms: 5000\n").unwrap();

        let config = Config::load_file(Some(&file.path().to_path_buf())).unwrap();
        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert_eq!(config.api.timeout_ms, 5000);
        assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.server.name, "egov-laws-mcp");
    }

    #[test]
    fn test_load_explicit_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.yml");
        assert!(Config::load_file(Some(&missing)).is_err());
    }

    #[test]
    fn test_load_malformed_file_fails() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "api: [not, a, map").unwrap();
        assert!(Config::load_file(Some(&file.path().to_path_buf())).is_err());
    }

    #[test]
    fn test_env_override() {
        let mut config = Config::default();
        config.apply_env(|key| (key == BASE_URL_ENV).then(|| "http://localhost:8080/api/2".to_string()));
        assert_eq!(config.api.base_url, "http://localhost:8080/api/2");
    }

    #[test]
    fn test_blank_env_ignored() {
        let mut config = Config::default();
        config.apply_env(|_| Some("  ".to_string()));
        assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_cli_overrides_env() {
        let mut config = Config::default();
        config.apply_env(|_| Some("http://env.example/api".to_string()));
        config.apply_cli(Some("http://cli.example/api"), Some(1500));
        assert_eq!(config.api.base_url, "http://cli.example/api");
        assert_eq!(config.api.timeout(), Duration::from_millis(1500));

        config.apply_cli(None, None);
        assert_eq!(config.api.base_url, "http://cli.example/api");
    }

    #[test]
    fn test_validate_defaults() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "api:\n  timeout_ms: 0\n").unwrap();

        let config = Config::load_file(Some(&file.path().to_path_buf())).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("timeout_ms"));

        let mut config = Config::default();
        config.apply_cli(None, Some(0));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_blank_base_url_rejected() {
        let mut config = Config::default();
        config.apply_cli(Some(""), None);
        assert!(config.validate().is_err());
    }
}
