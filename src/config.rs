use crate::error::{CardSortError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api_url: String,
    pub timeout_seconds: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8001".into(),
            timeout_seconds: 120,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| CardSortError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("card-sort").join("config.json"))
    }

    /// 接続先URL（環境変数を優先）
    pub fn api_url(&self) -> String {
        if let Ok(url) = std::env::var("CARD_SORT_API_URL") {
            if !url.trim().is_empty() {
                return url;
            }
        }

        self.api_url.clone()
    }

    pub fn set_api_url(&mut self, url: String) -> Result<()> {
        self.api_url = url;
        self.save()
    }
}
