use crate::ai_provider::AiProvider;
use crate::error::{DishMatchError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const VISION_API_KEY_ENV: &str = "GOOGLE_VISION_API_KEY";
pub const FIREBASE_PROJECT_ID_ENV: &str = "FIREBASE_PROJECT_ID";
pub const FIREBASE_API_KEY_ENV: &str = "FIREBASE_API_KEY";

/// 設定ファイル（~/.config/dish-match/config.json）
///
/// 認証情報は環境変数が優先。ソースやログには出さない。
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub vision_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub firebase_project_id: Option<String>,
    pub firebase_api_key: Option<String>,
    pub gemini_model: String,
    pub openai_model: String,
    pub timeout_seconds: u64,
    pub label_limit: usize,
    pub menu_ttl_seconds: u64,
    pub menu_collection: String,
}

/// Firestore 接続情報
#[derive(Clone)]
pub struct FirebaseCredentials {
    pub project_id: String,
    pub api_key: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            vision_api_key: None,
            gemini_api_key: None,
            openai_api_key: None,
            firebase_project_id: None,
            firebase_api_key: None,
            gemini_model: "gemini-2.0-flash".into(),
            openai_model: "gpt-4o-mini".into(),
            timeout_seconds: 10,
            label_limit: dish_match_common::DEFAULT_LABEL_LIMIT,
            menu_ttl_seconds: 3600,
            menu_collection: "menu".into(),
        }
    }
}

fn redact(value: &Option<String>) -> &'static str {
    match value {
        Some(v) if !v.trim().is_empty() => "<設定済み>",
        _ => "<未設定>",
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("vision_api_key", &redact(&self.vision_api_key))
            .field("gemini_api_key", &redact(&self.gemini_api_key))
            .field("openai_api_key", &redact(&self.openai_api_key))
            .field("firebase_project_id", &self.firebase_project_id)
            .field("firebase_api_key", &redact(&self.firebase_api_key))
            .field("gemini_model", &self.gemini_model)
            .field("openai_model", &self.openai_model)
            .field("timeout_seconds", &self.timeout_seconds)
            .field("label_limit", &self.label_limit)
            .field("menu_ttl_seconds", &self.menu_ttl_seconds)
            .field("menu_collection", &self.menu_collection)
            .finish()
    }
}

impl fmt::Debug for FirebaseCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FirebaseCredentials")
            .field("project_id", &self.project_id)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// 環境変数 → 設定ファイルの順で空でない値を探す
fn resolve(
    env_value: Option<String>,
    file_value: &Option<String>,
    name: &'static str,
    env: &'static str,
) -> Result<String> {
    env_value
        .filter(|v| !v.trim().is_empty())
        .or_else(|| file_value.clone().filter(|v| !v.trim().is_empty()))
        .map(|v| v.trim().to_string())
        .ok_or(DishMatchError::MissingCredential(name, env))
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(config_path)?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|e| DishMatchError::Config(format!("{}: {}", config_path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;
        self.save_to(&config_path)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| DishMatchError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("dish-match").join("config.json"))
    }

    /// 数値設定の妥当性チェック
    pub fn validate(&self) -> Result<()> {
        if self.timeout_seconds == 0 {
            return Err(DishMatchError::Config("timeout_seconds は1以上にしてください".into()));
        }
        if self.label_limit == 0 {
            return Err(DishMatchError::Config("label_limit は1以上にしてください".into()));
        }
        if self.menu_collection.trim().is_empty() {
            return Err(DishMatchError::Config("menu_collection が空です".into()));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn menu_ttl(&self) -> Duration {
        Duration::from_secs(self.menu_ttl_seconds)
    }

    pub fn vision_api_key(&self) -> Result<String> {
        resolve(
            std::env::var(VISION_API_KEY_ENV).ok(),
            &self.vision_api_key,
            "Vision APIキー",
            VISION_API_KEY_ENV,
        )
    }

    pub fn llm_api_key(&self, provider: AiProvider) -> Result<String> {
        let (file_value, name) = match provider {
            AiProvider::Gemini => (&self.gemini_api_key, "Gemini APIキー"),
            AiProvider::OpenAi => (&self.openai_api_key, "OpenAI APIキー"),
        };
        resolve(std::env::var(provider.api_key_env()).ok(), file_value, name, provider.api_key_env())
    }

    pub fn llm_model(&self, provider: AiProvider) -> &str {
        match provider {
            AiProvider::Gemini => &self.gemini_model,
            AiProvider::OpenAi => &self.openai_model,
        }
    }

    pub fn firebase(&self) -> Result<FirebaseCredentials> {
        let project_id = resolve(
            std::env::var(FIREBASE_PROJECT_ID_ENV).ok(),
            &self.firebase_project_id,
            "FirebaseプロジェクトID",
            FIREBASE_PROJECT_ID_ENV,
        )?;
        let api_key = resolve(
            std::env::var(FIREBASE_API_KEY_ENV).ok(),
            &self.firebase_api_key,
            "Firebase APIキー",
            FIREBASE_API_KEY_ENV,
        )?;
        Ok(FirebaseCredentials { project_id, api_key })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_prefers_env() {
        let file = Some("from-file".to_string());
        let value = resolve(Some("from-env".into()), &file, "key", "ENV").unwrap();
        assert_eq!(value, "from-env");
    }

    #[test]
    fn test_resolve_ignores_blank_env() {
        let file = Some("from-file".to_string());
        let value = resolve(Some("  ".into()), &file, "key", "ENV").unwrap();
        assert_eq!(value, "from-file");
    }

    #[test]
    fn test_resolve_missing_is_fatal() {
        let err = resolve(None, &Some(String::new()), "Vision APIキー", "GOOGLE_VISION_API_KEY").unwrap_err();
        assert!(err.is_fatal());
        assert!(err.to_string().contains("GOOGLE_VISION_API_KEY"));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = Config {
            gemini_api_key: Some("super-secret-value".into()),
            ..Default::default()
        };
        let debug = format!("{:?}", config);
        assert!(!debug.contains("super-secret-value"));
        assert!(debug.contains("<設定済み>"));
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.timeout_seconds, 10);
        assert_eq!(config.label_limit, 5);
        assert_eq!(config.menu_ttl(), Duration::from_secs(3600));
        assert_eq!(config.menu_collection, "menu");
    }
}
