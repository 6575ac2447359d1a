//! Language Cache
//!
//! Persists the last detected language with the time it was resolved.
//! Freshness is judged by the caller through [`CacheEntry::is_fresh`];
//! the stored record never expires on its own.

use super::Language;
use crate::storage::KeyValueStore;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Storage key shared with the settings screen of the mobile app
pub const CACHE_KEY: &str = "detectedLanguage";

/// Default freshness window
pub const DEFAULT_TTL: Duration = Duration::from_secs(60);

/// A cached detection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub language: Language,
    /// `None` for records written in the legacy bare-tag format
    pub resolved_at: Option<DateTime<Utc>>,
}

impl CacheEntry {
    /// Fresh while `now - resolved_at < ttl`. Legacy records are never fresh.
    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        let Some(resolved_at) = self.resolved_at else {
            return false;
        };
        let Ok(ttl) = chrono::Duration::from_std(ttl) else {
            return true;
        };
        now.signed_duration_since(resolved_at) < ttl
    }
}

/// On-disk record: `{"value": "hi-IN", "timestamp": 1718000000000}`
#[derive(Debug, Serialize, Deserialize)]
struct StoredEntry {
    value: String,
    /// Unix epoch milliseconds
    timestamp: i64,
}

/// Reads and writes the cached language through a key-value store
#[derive(Clone)]
pub struct LanguageCache {
    store: Arc<dyn KeyValueStore>,
}

impl LanguageCache {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Last stored entry. Missing, unreadable or unknown values read as `None`.
    pub async fn get(&self) -> Option<CacheEntry> {
        let raw = match self.store.get(CACHE_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!("⚠️ Language cache read failed: {}", e);
                return None;
            }
        };
        let entry = decode(&raw);
        if entry.is_none() {
            warn!("⚠️ Ignoring unrecognized language cache value: {}", raw);
        }
        entry
    }

    /// Overwrite the entry. Storage failures are logged, never returned.
    pub async fn set(&self, language: Language, now: DateTime<Utc>) {
        let record = StoredEntry {
            value: language.tag().to_string(),
            timestamp: now.timestamp_millis(),
        };
        let encoded = match serde_json::to_string(&record) {
            Ok(encoded) => encoded,
            Err(e) => {
                warn!("⚠️ Could not encode language cache entry: {}", e);
                return;
            }
        };
        match self.store.set(CACHE_KEY, &encoded).await {
            Ok(()) => debug!("💾 Cached language {} at {}", language, now),
            Err(e) => warn!("⚠️ Language cache write failed: {}", e),
        }
    }
}

fn decode(raw: &str) -> Option<CacheEntry> {
    if let Ok(stored) = serde_json::from_str::<StoredEntry>(raw) {
        let language = Language::from_tag(&stored.value)?;
        let resolved_at = Utc.timestamp_millis_opt(stored.timestamp).single();
        return Some(CacheEntry {
            language,
            resolved_at,
        });
    }

    // Older builds stored the bare tag (sometimes JSON-quoted)
    let bare = raw.trim().trim_matches('"');
    Language::from_tag(bare).map(|language| CacheEntry {
        language,
        resolved_at: None,
    })
}
