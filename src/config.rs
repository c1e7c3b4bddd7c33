use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use chrono::FixedOffset;

use crate::error::{AppError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_db_path")]
    pub db_path: String,

    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Offset used to bucket views into calendar days. Local time when unset.
    #[serde(default)]
    pub utc_offset_minutes: Option<i32>,
}

fn default_db_path() -> String {
    let data_dir = dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("explore-history");
    std::fs::create_dir_all(&data_dir).ok();
    data_dir.join("explore.db").to_string_lossy().to_string()
}

fn default_api_base_url() -> String {
    "https://edm.f418.eu".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            api_base_url: default_api_base_url(),
            request_timeout_secs: default_request_timeout(),
            utc_offset_minutes: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::parse(&content)
        } else {
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    /// Parse a config file, rejecting values the store cannot use.
    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.utc_offset()?;
        if config.api_base_url.trim().is_empty() {
            return Err(AppError::Config("api_base_url is empty".to_string()));
        }
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| AppError::Config(e.to_string()))?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("explore-history")
            .join("config.toml")
    }

    /// Configured calendar-day offset. `None` means local time at each write.
    pub fn utc_offset(&self) -> Result<Option<FixedOffset>> {
        self.utc_offset_minutes
            .map(|minutes| {
                minutes
                    .checked_mul(60)
                    .and_then(FixedOffset::east_opt)
                    .ok_or_else(|| {
                        AppError::Config(format!("utc_offset_minutes out of range: {}", minutes))
                    })
            })
            .transpose()
    }
}
