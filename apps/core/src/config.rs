use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const CONFIG_ENV_VAR: &str = "PIXICO_CONFIG";
const APP_DIR_NAME: &str = "pixico";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Per-surface result caps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultLimits {
    pub prompts: usize,
    pub articles: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub debounce_ms: u64,
    pub min_query_chars: usize,
    pub catalog_db_path: PathBuf,
    pub log_filter: String,
    pub compact_limits: ResultLimits,
    pub page_limits: ResultLimits,
    #[serde(skip)]
    pub config_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        let base = stable_app_data_dir();
        Self {
            debounce_ms: 250,
            min_query_chars: 2,
            compact_limits: ResultLimits {
                prompts: 5,
                articles: 3,
            },
            page_limits: ResultLimits {
                prompts: 30,
                articles: 12,
            },
            catalog_db_path: base.join("catalog.sqlite3"),
            log_filter: "info".to_string(),
            config_path: base.join("config.toml"),
        }
    }
}

impl Config {
    pub fn debounce(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.debounce_ms)
    }
}

pub fn stable_app_data_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os("XDG_DATA_HOME").filter(|v| !v.is_empty()) {
        return PathBuf::from(dir).join(APP_DIR_NAME);
    }
    if let Some(home) = std::env::var_os("HOME").filter(|v| !v.is_empty()) {
        return PathBuf::from(home)
            .join(".local")
            .join("share")
            .join(APP_DIR_NAME);
    }
    std::env::temp_dir().join(APP_DIR_NAME)
}

pub fn default_config_path() -> PathBuf {
    std::env::var_os(CONFIG_ENV_VAR)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| stable_app_data_dir().join("config.toml"))
}

/// Reads the config file at `path` (or the default location). A missing file
/// yields defaults pointing at that path.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let config_path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);

    let mut config = if config_path.exists() {
        let raw = std::fs::read_to_string(&config_path)?;
        toml::from_str::<Config>(&raw)?
    } else {
        Config::default()
    };
    config.config_path = config_path;

    validate(&config)?;
    Ok(config)
}

pub fn save(config: &Config) -> Result<(), ConfigError> {
    validate(config)?;
    if let Some(parent) = config.config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let encoded = toml::to_string_pretty(config)?;
    std::fs::write(&config.config_path, encoded)?;
    Ok(())
}

fn validate_limits(name: &str, limits: &ResultLimits) -> Result<(), ConfigError> {
    for (field, value) in [("prompts", limits.prompts), ("articles", limits.articles)] {
        if !(1..=100).contains(&value) {
            return Err(ConfigError::Invalid(format!(
                "{name}.{field} must be between 1 and 100"
            )));
        }
    }
    Ok(())
}

pub fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if cfg.debounce_ms > 5_000 {
        return Err(ConfigError::Invalid(
            "debounce_ms must be at most 5000".into(),
        ));
    }

    if !(1..=32).contains(&cfg.min_query_chars) {
        return Err(ConfigError::Invalid(
            "min_query_chars must be between 1 and 32".into(),
        ));
    }

    validate_limits("compact_limits", &cfg.compact_limits)?;
    validate_limits("page_limits", &cfg.page_limits)?;

    if cfg.catalog_db_path.as_os_str().is_empty() {
        return Err(ConfigError::Invalid("catalog_db_path is required".into()));
    }

    if cfg.log_filter.trim().is_empty() {
        return Err(ConfigError::Invalid("log_filter is required".into()));
    }

    Ok(())
}
