use crate::error::BotResult;
use crate::language::{Language, LanguageMode};
use crate::storage::KeyValueStore;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// Settings keys written by the language picker
pub const MODE_KEY: &str = "languageMode";
pub const LANGUAGE_KEY: &str = "selectedLanguage";

/// Environment variable overriding the Gemini API key
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // Language
    pub language_mode: LanguageMode,
    pub selected_language: Language,
    pub cache_ttl_secs: u64,
    /// Use an expired cached language when fresh detection finds nothing
    pub stale_cache_fallback: bool,

    // AI
    pub gemini: GeminiConfig,

    // Speech output
    pub tts_engine: String,
    /// Stay in `Speaking` until the TTS engine reports it finished
    pub await_tts_finish: bool,
    /// Pause between showing the reply and speaking it
    pub speak_delay_ms: u64,

    // Robot
    pub robot: RobotConfig,

    // Meta
    pub store_path: String,
    pub log_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    pub base_url: String,
    pub api_version: String,
    pub model: String,
    pub api_key: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RobotConfig {
    /// When false every recognized motion phrase is skipped
    pub enabled: bool,
    /// Motion controller endpoint; no URL means mock mode
    pub backend_url: Option<String>,
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            language_mode: LanguageMode::Auto,
            selected_language: Language::Hindi,
            cache_ttl_secs: 60,
            stale_cache_fallback: false,
            gemini: GeminiConfig::default(),
            tts_engine: "console".to_string(),
            await_tts_finish: true,
            speak_delay_ms: 300,
            robot: RobotConfig::default(),
            store_path: dirs::data_dir()
                .unwrap_or_default()
                .join("aivoicy/store.db")
                .to_string_lossy()
                .to_string(),
            log_level: "INFO".to_string(),
        }
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            api_version: "v1".to_string(),
            model: "gemini-2.5-flash".to_string(),
            api_key: String::new(),
            timeout_secs: 20,
        }
    }
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            backend_url: None,
            timeout_secs: 3,
        }
    }
}

impl Config {
    /// Load config from `path`; a corrupt file is backed up and replaced by defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            match serde_json::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    warn!("⚠️ Config file corrupted or invalid, using defaults: {}", e);
                    let backup_path = path.with_extension("json.corrupt");
                    let _ = std::fs::rename(path, &backup_path);
                    Self::default()
                }
            }
        } else {
            Self::default()
        };
        config.apply_env();
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    fn apply_env(&mut self) {
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.trim().is_empty() {
                self.gemini.api_key = key;
            }
        }
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn speak_delay(&self) -> Duration {
        Duration::from_millis(self.speak_delay_ms)
    }
}

/// Language settings persisted in the key-value store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguageSettings {
    pub mode: LanguageMode,
    pub language: Language,
}

impl LanguageSettings {
    /// Read stored settings, keeping `fallback` values for anything missing or unknown
    pub async fn load(store: &dyn KeyValueStore, fallback: LanguageSettings) -> Self {
        let mut settings = fallback;
        match store.get(MODE_KEY).await {
            Ok(Some(raw)) => match LanguageMode::parse(&raw) {
                Some(mode) => settings.mode = mode,
                None => warn!("⚠️ Ignoring stored language mode '{}'", raw),
            },
            Ok(None) => {}
            Err(e) => warn!("⚠️ Could not read language mode: {}", e),
        }
        match store.get(LANGUAGE_KEY).await {
            Ok(Some(raw)) => match Language::from_tag(&raw) {
                Some(language) => settings.language = language,
                None => warn!("⚠️ Ignoring stored language '{}'", raw),
            },
            Ok(None) => {}
            Err(e) => warn!("⚠️ Could not read selected language: {}", e),
        }
        debug!(
            "🌐 Language settings: mode={} language={}",
            settings.mode.as_str(),
            settings.language
        );
        settings
    }

    pub async fn save(&self, store: &dyn KeyValueStore) -> BotResult<()> {
        store.set(MODE_KEY, self.mode.as_str()).await?;
        store.set(LANGUAGE_KEY, self.language.tag()).await?;
        Ok(())
    }
}

impl From<&Config> for LanguageSettings {
    fn from(config: &Config) -> Self {
        Self {
            mode: config.language_mode,
            language: config.selected_language,
        }
    }
}

pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("aivoicy")
        .join("config.json")
}
