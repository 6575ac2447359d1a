//! Language Resolution
//!
//! The closed set of supported languages plus the pieces that decide which
//! one a turn runs in:
//! - classifier: offline script/keyword heuristics
//! - detection: LLM-assisted detection with a graceful degradation ladder
//! - cache: last detected language with a timestamp

pub mod cache;
pub mod classifier;
pub mod detection;

pub use cache::{CacheEntry, LanguageCache};
pub use classifier::classify;
pub use detection::Detection;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported spoken languages, serialized as their tag (e.g. `hi-IN`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Language {
    #[serde(rename = "hi-IN")]
    Hindi,
    #[serde(rename = "ta-IN")]
    Tamil,
    #[serde(rename = "si-LK")]
    Sinhala,
    #[default]
    #[serde(rename = "en-US")]
    English,
}

impl Language {
    /// All supported languages in classifier priority order
    pub const ALL: [Language; 4] = [
        Language::Hindi,
        Language::Tamil,
        Language::Sinhala,
        Language::English,
    ];

    /// BCP-47-like tag handed to the speech and TTS engines
    pub fn tag(self) -> &'static str {
        match self {
            Language::Hindi => "hi-IN",
            Language::Tamil => "ta-IN",
            Language::Sinhala => "si-LK",
            Language::English => "en-US",
        }
    }

    /// Primary subtag, used for espeak voices and loose matching
    pub fn code(self) -> &'static str {
        match self {
            Language::Hindi => "hi",
            Language::Tamil => "ta",
            Language::Sinhala => "si",
            Language::English => "en",
        }
    }

    /// English display name
    pub fn name(self) -> &'static str {
        match self {
            Language::Hindi => "Hindi",
            Language::Tamil => "Tamil",
            Language::Sinhala => "Sinhala",
            Language::English => "English",
        }
    }

    /// Lenient lookup: full tag, primary subtag or English name, any case
    pub fn from_tag(input: &str) -> Option<Self> {
        let needle = input.trim().replace('_', "-").to_lowercase();
        if needle.is_empty() {
            return None;
        }
        Self::ALL.into_iter().find(|lang| {
            needle == lang.tag().to_lowercase()
                || needle == lang.code()
                || needle == lang.name().to_lowercase()
                || needle.split('-').next() == Some(lang.code())
        })
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// How the active language of a turn is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageMode {
    /// Fixed by the user's setting
    Manual,
    /// Detected per turn, reusing a fresh cached detection
    #[default]
    Auto,
}

impl LanguageMode {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "manual" => Some(LanguageMode::Manual),
            "auto" => Some(LanguageMode::Auto),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LanguageMode::Manual => "manual",
            LanguageMode::Auto => "auto",
        }
    }
}

/// Where a turn's active language came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageSource {
    Manual,
    Cached,
    Detected,
    StaleCache,
}
