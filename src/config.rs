// src/config.rs
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::errors::{ConsoleError, Result};

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// High-level application configuration.
///
/// Built from defaults, then an optional TOML file, then environment
/// variables (highest precedence).
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Base URL of the prompt backend, e.g. `http://localhost:8000`.
    pub api_url: String,
    pub host: String,
    pub port: u16,
    pub request_timeout_secs: u64,
    /// Upper bound on in-flight executions per batch. `None` fans out fully.
    pub max_concurrency: Option<usize>,
}

/// Shape of the optional `config.toml`. Every key may be omitted.
#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    api_url: Option<String>,
    host: Option<String>,
    port: Option<u16>,
    request_timeout_secs: Option<u64>,
    max_concurrency: Option<usize>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            max_concurrency: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from `.env`, the config file (if any) and the environment.
    pub fn load() -> Result<Self> {
        if let Err(e) = dotenvy::dotenv() {
            log::debug!("No .env file loaded: {}", e);
        }

        let mut config = match config_file_path() {
            Some(path) if path.exists() => {
                log::info!("Loading configuration from {}", path.display());
                Self::from_file(&path)?
            }
            Some(path) => {
                log::debug!("No config file at {}, using defaults", path.display());
                Self::default()
            }
            None => Self::default(),
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let file: FileConfig = toml::from_str(raw)?;
        let defaults = Self::default();
        Ok(Self {
            api_url: file.api_url.unwrap_or(defaults.api_url),
            host: file.host.unwrap_or(defaults.host),
            port: file.port.unwrap_or(defaults.port),
            request_timeout_secs: file
                .request_timeout_secs
                .unwrap_or(defaults.request_timeout_secs),
            max_concurrency: file.max_concurrency,
        })
    }

    /// Apply `PROMPTBENCH_*` overrides read through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("PROMPTBENCH_API_URL") {
            self.api_url = url.trim().to_string();
        }
        if let Some(host) = lookup("PROMPTBENCH_HOST") {
            self.host = host.trim().to_string();
        }
        if let Some(port) = lookup("PROMPTBENCH_PORT") {
            self.port = parse_var("PROMPTBENCH_PORT", &port)?;
        }
        if let Some(timeout) = lookup("PROMPTBENCH_REQUEST_TIMEOUT_SECS") {
            self.request_timeout_secs = parse_var("PROMPTBENCH_REQUEST_TIMEOUT_SECS", &timeout)?;
        }
        if let Some(limit) = lookup("PROMPTBENCH_MAX_CONCURRENCY") {
            self.max_concurrency = Some(parse_var("PROMPTBENCH_MAX_CONCURRENCY", &limit)?);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            return Err(ConsoleError::Config(format!(
                "API URL must start with http:// or https://, got '{}'",
                self.api_url
            )));
        }
        if self.port == 0 {
            return Err(ConsoleError::Config("Port must be non-zero".to_string()));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConsoleError::Config(
                "Request timeout must be at least one second".to_string(),
            ));
        }
        if self.max_concurrency == Some(0) {
            return Err(ConsoleError::Config(
                "Max concurrency must be at least 1 when set".to_string(),
            ));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn bind_address(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }
}

fn config_file_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("PROMPTBENCH_CONFIG") {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir().map(|dir| dir.join("promptbench").join("config.toml"))
}

fn parse_var<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| ConsoleError::Config(format!("{} has an invalid value: '{}'", key, value)))
}
