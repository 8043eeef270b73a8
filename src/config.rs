use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";
const DEFAULT_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_MAX_RESULTS: usize = 100;
const DEFAULT_PRELOAD_LIMIT: u32 = 500;
const CONFIG_DIR: &str = ".orgreview";

/// A validation error in the configuration
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]: {}", self.field, self.message)
    }
}

/// Backend connection settings
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct ApiConfig {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

impl ApiConfig {
    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS)
    }
}

/// Settings for the organisation picker
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct SearchConfig {
    /// Cap on hits returned by the search index
    #[serde(default)]
    pub max_results: Option<usize>,
    /// How many organisation names to preload before searching
    #[serde(default)]
    pub preload_limit: Option<u32>,
}

impl SearchConfig {
    pub fn max_results(&self) -> usize {
        self.max_results.unwrap_or(DEFAULT_MAX_RESULTS)
    }

    pub fn preload_limit(&self) -> u32 {
        self.preload_limit.unwrap_or(DEFAULT_PRELOAD_LIMIT)
    }
}

/// Request journal settings
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct JournalConfig {
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

impl JournalConfig {
    pub fn enabled(&self) -> bool {
        self.enabled.unwrap_or(false)
    }

    pub fn dir(&self) -> PathBuf {
        self.dir
            .clone()
            .unwrap_or_else(|| Path::new(CONFIG_DIR).join("journal"))
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub journal: JournalConfig,
}

impl Config {
    /// Load configuration from default paths
    /// Priority: local (.orgreview/config.local.toml) > project (.orgreview/config.toml)
    /// > user (~/.orgreview/config.toml)
    pub fn load() -> Result<Self> {
        let home = dirs::home_dir();
        Self::load_layers(home.as_deref(), Path::new("."))
    }

    /// Layered load rooted at explicit directories
    pub fn load_layers(home: Option<&Path>, root: &Path) -> Result<Self> {
        let mut config = Self::default();

        let mut layers = Vec::new();
        if let Some(home) = home {
            layers.push(home.join(CONFIG_DIR).join("config.toml"));
        }
        layers.push(root.join(CONFIG_DIR).join("config.toml"));
        layers.push(root.join(CONFIG_DIR).join("config.local.toml"));

        for path in layers {
            if path.exists() {
                debug!("loading config layer {}", path.display());
                config.merge(Self::load_from(&path)?);
            }
        }

        Ok(config)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        Ok(config)
    }

    /// Merge another config into this one (other takes priority for every
    /// value it sets)
    pub fn merge(&mut self, other: Config) {
        if other.api.base_url.is_some() {
            self.api.base_url = other.api.base_url;
        }
        if other.api.timeout_ms.is_some() {
            self.api.timeout_ms = other.api.timeout_ms;
        }

        if other.search.max_results.is_some() {
            self.search.max_results = other.search.max_results;
        }
        if other.search.preload_limit.is_some() {
            self.search.preload_limit = other.search.preload_limit;
        }

        if other.journal.enabled.is_some() {
            self.journal.enabled = other.journal.enabled;
        }
        if other.journal.dir.is_some() {
            self.journal.dir = other.journal.dir;
        }
    }

    /// Validate configuration and return any errors found
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        let base_url = self.api.base_url();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            errors.push(ValidationError {
                field: "api.base_url".to_string(),
                message: format!("Expected an http(s) URL, got '{}'", base_url),
            });
        }

        if self.api.timeout_ms() == 0 {
            errors.push(ValidationError {
                field: "api.timeout_ms".to_string(),
                message: "Must be greater than 0".to_string(),
            });
        }

        if self.search.max_results() == 0 {
            errors.push(ValidationError {
                field: "search.max_results".to_string(),
                message: "Must be greater than 0".to_string(),
            });
        }

        if (self.search.preload_limit() as usize) < self.search.max_results() {
            errors.push(ValidationError {
                field: "search.preload_limit".to_string(),
                message: format!(
                    "Must be at least search.max_results ({})",
                    self.search.max_results()
                ),
            });
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
