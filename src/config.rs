use serde::Deserialize;
use std::path::PathBuf;
use tracing::warn;

use crate::error::{Result, ScoutError};

const API_URL_ENV: &str = "SCOUT_API_URL";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub search_path: String,
    pub move_cursor_path: String,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8888/.netlify/functions".to_string(),
            search_path: "/github-users-search".to_string(),
            move_cursor_path: "/github-users-move-cursor".to_string(),
            timeout_secs: 30,
            user_agent: "scout".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
}

fn config_path() -> Option<PathBuf> {
    let config_dir = dirs::config_dir()?;
    Some(config_dir.join("scout").join("config.toml"))
}

impl Config {
    /// Load `~/.config/scout/config.toml`, then apply `SCOUT_API_URL`.
    /// Missing or broken files fall back to defaults.
    pub fn load() -> Self {
        let mut config = config_path()
            .and_then(|path| std::fs::read_to_string(path).ok())
            .map(|content| {
                Self::parse(&content).unwrap_or_else(|e| {
                    warn!(error = %e, "ignoring unreadable config file");
                    Config::default()
                })
            })
            .unwrap_or_default();

        if let Ok(url) = std::env::var(API_URL_ENV) {
            config.apply_api_url(Some(url));
        }
        config
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| ScoutError::Config(e.to_string()))
    }

    /// Override the base URL; blank values are ignored
    pub fn apply_api_url(&mut self, url: Option<String>) {
        if let Some(url) = url.filter(|u| !u.trim().is_empty()) {
            self.api.base_url = url.trim().to_string();
        }
    }
}
