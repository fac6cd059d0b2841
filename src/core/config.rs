//! Configuration management with layered hierarchy

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::core::view::PageSize;

/// Backend used when nothing else is configured
pub const DEFAULT_API_URL: &str = "http://localhost:5000";

/// Default per-request timeout
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// MAO console configuration with layered hierarchy
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the backend (without the `/api` suffix)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    /// Default rows per page for list commands
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<usize>,

    /// HTTP timeout in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    /// Default output format
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_format: Option<String>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load() -> Self {
        let mut config = Config::default();

        // 1. Built-in defaults (already in Default impl + accessors)

        // 2. User config (~/.config/mao/config.yaml)
        if let Some(path) = Self::config_path() {
            if let Some(file_config) = Self::load_from_path(&path) {
                config.merge(file_config);
            }
        }

        // 3. Environment variables
        if let Ok(url) = std::env::var("MAO_API_URL") {
            if !url.trim().is_empty() {
                config.api_url = Some(url);
            }
        }
        if let Ok(size) = std::env::var("MAO_PAGE_SIZE") {
            if let Ok(size) = size.trim().parse() {
                config.page_size = Some(size);
            }
        }
        if let Ok(timeout) = std::env::var("MAO_TIMEOUT") {
            if let Ok(timeout) = timeout.trim().parse() {
                config.timeout_secs = Some(timeout);
            }
        }

        config
    }

    /// Read a single config file, ignoring missing or malformed files
    pub fn load_from_path(path: &std::path::Path) -> Option<Self> {
        if !path.exists() {
            return None;
        }
        let contents = std::fs::read_to_string(path).ok()?;
        match serde_yml::from_str::<Config>(&contents) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring malformed config");
                None
            }
        }
    }

    /// Directory holding config.yaml and session.yaml
    ///
    /// `MAO_CONFIG_DIR` overrides the platform default.
    pub fn config_dir() -> Option<PathBuf> {
        if let Ok(dir) = std::env::var("MAO_CONFIG_DIR") {
            if !dir.trim().is_empty() {
                return Some(PathBuf::from(dir));
            }
        }
        directories::ProjectDirs::from("", "", "mao").map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Get the path to the config file
    pub fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.api_url.is_some() {
            self.api_url = other.api_url;
        }
        if other.page_size.is_some() {
            self.page_size = other.page_size;
        }
        if other.timeout_secs.is_some() {
            self.timeout_secs = other.timeout_secs;
        }
        if other.default_format.is_some() {
            self.default_format = other.default_format;
        }
    }

    /// Backend base URL
    pub fn api_url(&self) -> String {
        self.api_url
            .clone()
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
    }

    /// Configured page size, falling back to 10 when unset or not an allowed size
    pub fn page_size(&self) -> PageSize {
        self.page_size
            .and_then(|n| PageSize::try_from(n).ok())
            .unwrap_or_default()
    }

    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)
    }
}
