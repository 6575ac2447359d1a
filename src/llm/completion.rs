//! Completion Client
//!
//! Turns a transcript into a spoken reply. `complete` is total: every
//! failure becomes a localized fallback sentence, so callers never branch
//! on LLM errors.

use super::LanguageModel;
use crate::error::VoiceBotError;
use crate::i18n::{self, Message};
use crate::language::detection::{detection_prompt, Detection};
use crate::language::Language;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Reply produced for one turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionResult {
    pub text: String,
    pub succeeded: bool,
}

#[derive(Clone)]
pub struct CompletionClient {
    model: Arc<dyn LanguageModel>,
}

impl CompletionClient {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }

    /// Build the language-tagged prompt sent for a reply
    pub fn build_prompt(prompt_body: &str, language: Language) -> String {
        format!("{}{}", i18n::instruction_hint(language), prompt_body.trim())
    }

    /// Ask for a reply in `language`. Never fails, never returns empty text.
    pub async fn complete(&self, prompt_body: &str, language: Language) -> String {
        self.complete_detailed(prompt_body, language).await.text
    }

    /// Like [`complete`](Self::complete), also reporting whether the model answered
    pub async fn complete_detailed(&self, prompt_body: &str, language: Language) -> CompletionResult {
        if prompt_body.trim().is_empty() {
            return fallback(language, Message::PleaseSpeak);
        }

        let prompt = Self::build_prompt(prompt_body, language);
        match self.model.generate(&prompt).await {
            Ok(text) if !text.trim().is_empty() => {
                info!("🧠 {} replied ({} chars)", self.model.name(), text.chars().count());
                CompletionResult {
                    text,
                    succeeded: true,
                }
            }
            Ok(_) => fallback(language, Message::NotUnderstood),
            Err(e) => {
                warn!("⚠️ Completion failed, using fallback: {}", e);
                fallback(language, fallback_for(&e))
            }
        }
    }

    /// Identify the transcript's language through the model, degrading to
    /// the offline classifier when the call fails
    pub async fn detect_language(&self, transcript: &str) -> Detection {
        match self.model.generate(&detection_prompt(transcript)).await {
            Ok(reply) => {
                debug!("🔎 Detection reply: {}", reply);
                Detection::from_reply(&reply, transcript)
            }
            Err(e) => {
                warn!("⚠️ Language detection call failed: {}", e);
                Detection::from_transcript(transcript)
            }
        }
    }
}

fn fallback_for(error: &VoiceBotError) -> Message {
    if error.is_transport() {
        Message::ServerError
    } else {
        Message::NotUnderstood
    }
}

fn fallback(language: Language, key: Message) -> CompletionResult {
    CompletionResult {
        text: i18n::tr(language, key).to_string(),
        succeeded: false,
    }
}
