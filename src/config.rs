use crate::error::{LensError, Result};
use product_lens_common::DEFAULT_THRESHOLD;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// APIキーを読む環境変数（先頭が優先）
const API_KEY_ENV_VARS: &[&str] = &["GEMINI_API_KEY", "API_KEY"];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    pub model: String,
    /// 1回の検索で送る候補商品数
    pub candidate_count: usize,
    pub default_threshold: u8,
    pub request_timeout_seconds: u64,
    pub fetch_timeout_seconds: u64,
    /// 画像取得時にURLの前へ付ける中継サーバー（例: "https://cors-anywhere.herokuapp.com/"）
    pub cors_proxy: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
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
            Ok(Self::default_config())
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
            .ok_or_else(|| LensError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("product-lens").join("config.json"))
    }

    fn default_config() -> Self {
        Self {
            api_key: None,
            model: "gemini-2.5-flash".into(),
            candidate_count: 20,
            default_threshold: DEFAULT_THRESHOLD,
            request_timeout_seconds: 90,
            fetch_timeout_seconds: 15,
            cors_proxy: None,
        }
    }

    pub fn get_api_key(&self) -> Result<String> {
        // 環境変数を優先
        for name in API_KEY_ENV_VARS {
            if let Ok(key) = std::env::var(name) {
                if !key.trim().is_empty() {
                    return Ok(key);
                }
            }
        }

        self.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or(LensError::MissingApiKey)
    }

    pub fn set_api_key(&mut self, key: String) -> Result<()> {
        self.api_key = Some(key);
        self.save()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds.max(1))
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_seconds.max(1))
    }

    /// 設定値の検証
    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(LensError::Config("modelが空です".into()));
        }
        if self.candidate_count == 0 {
            return Err(LensError::Config("candidate_countは1以上にしてください".into()));
        }
        if self.default_threshold > 100 {
            return Err(LensError::Config("default_thresholdは0〜100です".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.model, "gemini-2.5-flash");
        assert_eq!(config.candidate_count, 20);
        assert_eq!(config.default_threshold, 50);
        assert!(config.cors_proxy.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_config_file_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{"candidate_count": 8}"#).unwrap();
        assert_eq!(config.candidate_count, 8);
        assert_eq!(config.model, "gemini-2.5-flash");
        assert_eq!(config.fetch_timeout_seconds, 15);
    }

    #[test]
    fn test_validate_rejects_zero_candidates() {
        let config = Config {
            candidate_count: 0,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(LensError::Config(_))));
    }

    #[test]
    fn test_timeouts_never_zero() {
        let config = Config {
            request_timeout_seconds: 0,
            fetch_timeout_seconds: 0,
            ..Config::default()
        };
        assert_eq!(config.request_timeout(), Duration::from_secs(1));
        assert_eq!(config.fetch_timeout(), Duration::from_secs(1));
    }
}
