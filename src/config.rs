//! Configuration loader and validator for the menu board.
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::theme::Theme;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(&'static str),
}

/// Root configuration struct mirroring the YAML schema exactly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    pub app: App,
    pub menu: Menu,
    #[serde(default)]
    pub theme: ThemeSettings,
}

/// App-level settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct App {
    pub data_dir: String,
}

/// Remote source and cache settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Menu {
    /// Endpoint returning the menu payload. When absent the remote tier is skipped.
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default = "default_cache_key")]
    pub cache_key: String,
    #[serde(default = "default_cache_ts_key")]
    pub cache_ts_key: String,
    #[serde(default = "default_cache_ttl_ms")]
    pub cache_ttl_ms: u64,
    #[serde(default)]
    pub request_timeout_ms: Option<u64>,
    #[serde(default = "default_true")]
    pub use_bundled_default: bool,
}

/// Persisted theme settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ThemeSettings {
    #[serde(default = "default_theme_key")]
    pub storage_key: String,
    #[serde(default)]
    pub default: Theme,
}

impl Default for ThemeSettings {
    fn default() -> Self {
        Self {
            storage_key: default_theme_key(),
            default: Theme::default(),
        }
    }
}

fn default_cache_key() -> String {
    "menuDataCache.v1".to_string()
}

fn default_cache_ts_key() -> String {
    "menuDataCacheTs.v1".to_string()
}

fn default_cache_ttl_ms() -> u64 {
    10 * 60 * 1000
}

fn default_theme_key() -> String {
    "theme".to_string()
}

fn default_true() -> bool {
    true
}

impl Menu {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.cache_ttl_ms)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }

    /// Endpoint URL with surrounding whitespace removed; blank values count as unset.
    pub fn api_url(&self) -> Option<&str> {
        self.api_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}

impl App {
    /// `data_dir` with a leading `~/` expanded against `$HOME`.
    pub fn resolved_data_dir(&self) -> String {
        expand_home(&self.data_dir)
    }
}

/// Expand a leading `~/` against `$HOME`; other paths are returned as-is.
pub(crate) fn expand_home(path: &str) -> String {
    match (path.strip_prefix("~/"), std::env::var("HOME")) {
        (Some(rest), Ok(home)) => format!("{}/{}", home.trim_end_matches('/'), rest),
        _ => path.to_string(),
    }
}

impl Config {
    /// Ensure required directories exist (creates `app.data_dir` if missing).
    pub fn ensure_dirs(&self) -> Result<(), std::io::Error> {
        if self.app.data_dir.trim().is_empty() {
            return Ok(());
        }
        fs::create_dir_all(self.app.resolved_data_dir())
    }

    /// SQLite URL for the key-value store, honouring `DATABASE_URL`.
    pub fn database_url(&self) -> String {
        std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| format!("sqlite://{}/menu.db", self.app.resolved_data_dir()))
    }
}

/// Load configuration from a YAML file and validate it.
/// - If `path` is None, uses `config.yaml` in the current working directory.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = path.unwrap_or_else(|| Path::new("config.yaml"));
    let content = fs::read_to_string(path)?;
    let cfg: Config = serde_yaml::from_str(&content)?;
    validate(&cfg)?;
    Ok(cfg)
}

/// Validate a configuration instance.
fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if cfg.app.data_dir.trim().is_empty() {
        return Err(ConfigError::Invalid("app.data_dir must be non-empty"));
    }

    if let Some(url) = cfg.menu.api_url() {
        if reqwest::Url::parse(url).is_err() {
            return Err(ConfigError::Invalid("menu.api_url must be an absolute URL"));
        }
    }
    if cfg.menu.cache_key.trim().is_empty() {
        return Err(ConfigError::Invalid("menu.cache_key must be non-empty"));
    }
    if cfg.menu.cache_ts_key.trim().is_empty() {
        return Err(ConfigError::Invalid("menu.cache_ts_key must be non-empty"));
    }
    if cfg.menu.cache_key == cfg.menu.cache_ts_key {
        return Err(ConfigError::Invalid(
            "menu.cache_key and menu.cache_ts_key must differ",
        ));
    }
    if cfg.menu.cache_ttl_ms == 0 {
        return Err(ConfigError::Invalid("menu.cache_ttl_ms must be > 0"));
    }
    if cfg.menu.request_timeout_ms == Some(0) {
        return Err(ConfigError::Invalid("menu.request_timeout_ms must be > 0"));
    }

    let theme_key = cfg.theme.storage_key.trim();
    if theme_key.is_empty() {
        return Err(ConfigError::Invalid("theme.storage_key must be non-empty"));
    }
    if theme_key == cfg.menu.cache_key || theme_key == cfg.menu.cache_ts_key {
        return Err(ConfigError::Invalid(
            "theme.storage_key must not collide with the cache keys",
        ));
    }

    Ok(())
}

/// Returns the example YAML configuration.
pub fn example() -> &'static str {
    r#"app:
  data_dir: "./data"

menu:
  api_url: "https://menu.example.com/api/menu"
  cache_key: "menuDataCache.v1"
  cache_ts_key: "menuDataCacheTs.v1"
  cache_ttl_ms: 900000
  request_timeout_ms: 8000
  use_bundled_default: true

theme:
  storage_key: "theme"
  default: "dark"
"#
}
