//! TTS (Text-to-Speech) Module
//!
//! Provides a unified interface for the speech output backends.

use crate::config::Config;
use crate::error::BotResult;
use crate::events::EventSink;
use crate::language::Language;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

pub mod console;
pub mod system;

pub use console::ConsoleTts;
pub use system::SystemEngine;

/// Trait for TTS engines
#[async_trait]
pub trait TtsEngine: Send + Sync + std::fmt::Debug {
    /// Register the session's event sink for finish notifications
    fn attach(&self, _sink: EventSink) {}

    /// Drop the event sink
    fn detach(&self) {}

    /// Select the voice language for subsequent `speak` calls
    async fn set_language(&self, language: Language) -> BotResult<()>;

    /// Cut off any utterance still playing
    async fn stop(&self) -> BotResult<()>;

    /// Start speaking the given text; returns once playback is issued
    async fn speak(&self, text: &str) -> BotResult<()>;

    /// Get the engine name
    fn name(&self) -> &str;
}

/// Factory to create the configured TTS engine
pub fn create_engine(config: &Config) -> Arc<dyn TtsEngine> {
    info!("🛠️ Creating TTS engine: {}", config.tts_engine);
    let engine: Arc<dyn TtsEngine> = match config.tts_engine.as_str() {
        "system" => Arc::new(SystemEngine::new()),
        "console" => Arc::new(ConsoleTts::new()),
        other => {
            warn!("  - Unknown engine '{}', falling back to console", other);
            Arc::new(ConsoleTts::new())
        }
    };
    info!("✅ TTS engine '{}' initialized", engine.name());
    engine
}
