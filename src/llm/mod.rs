//! LLM Integration
//!
//! `LanguageModel` is the fallible seam to a text generation endpoint;
//! `CompletionClient` wraps it into the total, localized API the turn
//! coordinator uses.

pub mod completion;
pub mod gemini;

use crate::error::BotResult;
use async_trait::async_trait;

pub use completion::{CompletionClient, CompletionResult};
pub use gemini::GeminiClient;

/// A text generation endpoint
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Generate a reply for the prompt
    async fn generate(&self, prompt: &str) -> BotResult<String>;

    /// Get the backend name
    fn name(&self) -> &str;
}
