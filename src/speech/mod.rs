//! Speech Recognition Module
//!
//! The coordinator only needs to start and stop the recognizer and receive
//! its events. Backends:
//! - Console: utterances typed on stdin (also used for scripted demos)

pub mod console;

use crate::error::BotResult;
use crate::events::EventSink;
use crate::language::Language;
use async_trait::async_trait;

pub use console::ConsoleSpeech;

/// Trait for speech recognizers
#[async_trait]
pub trait SpeechEngine: Send + Sync {
    /// Register the session's event sink. Called once at session start.
    fn attach(&self, sink: EventSink);

    /// Drop the event sink. Called at session teardown.
    fn detach(&self);

    /// Ask for microphone access. Default: granted.
    async fn request_permission(&self) -> bool {
        true
    }

    /// Begin recognizing in the given language. Emits `SpeechEvent::Start` once
    /// the recognizer runs; results are ignored until it arrives.
    async fn start(&self, language: Language) -> BotResult<()>;

    /// Stop recognizing; a pending final result may still be delivered
    async fn stop(&self) -> BotResult<()>;

    /// Get the engine name
    fn name(&self) -> &str;
}
