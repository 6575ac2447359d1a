//! Console speech backend
//!
//! Stands in for a microphone: the front end feeds typed utterances in
//! with [`ConsoleSpeech::hear`], which replays them as a growing series of
//! partial results followed by the final result.

use super::SpeechEngine;
use crate::error::{BotResult, VoiceBotError};
use crate::events::{EventSink, SpeechEvent};
use crate::language::Language;
use async_trait::async_trait;
use std::sync::Mutex;
use tracing::{debug, info};

#[derive(Debug, Default)]
struct ConsoleState {
    sink: Option<EventSink>,
    listening: Option<Language>,
}

#[derive(Debug, Default)]
pub struct ConsoleSpeech {
    state: Mutex<ConsoleState>,
}

impl ConsoleSpeech {
    pub fn new() -> Self {
        Self::default()
    }

    /// Language the recognizer is listening in, if started
    pub fn listening(&self) -> Option<Language> {
        self.state.lock().ok().and_then(|s| s.listening)
    }

    /// Deliver an utterance. Ignored unless the recognizer was started.
    pub fn hear(&self, utterance: &str) -> bool {
        let Some(sink) = self.active_sink() else {
            debug!("Console speech not listening, dropping '{}'", utterance);
            return false;
        };

        let words: Vec<&str> = utterance.split_whitespace().collect();
        for n in 1..words.len() {
            sink.speech(SpeechEvent::Partial {
                text: words[..n].join(" "),
            });
        }
        sink.speech(SpeechEvent::Final {
            text: utterance.trim().to_string(),
        });
        if let Ok(mut state) = self.state.lock() {
            state.listening = None;
        }
        sink.speech(SpeechEvent::End)
    }

    fn active_sink(&self) -> Option<EventSink> {
        let state = self.state.lock().ok()?;
        state.listening?;
        state.sink.clone()
    }
}

#[async_trait]
impl SpeechEngine for ConsoleSpeech {
    fn attach(&self, sink: EventSink) {
        if let Ok(mut state) = self.state.lock() {
            state.sink = Some(sink);
        }
    }

    fn detach(&self) {
        if let Ok(mut state) = self.state.lock() {
            state.sink = None;
            state.listening = None;
        }
    }

    async fn start(&self, language: Language) -> BotResult<()> {
        let sink = {
            let mut state = self.state.lock()?;
            let sink = state.sink.clone().ok_or_else(|| VoiceBotError::SpeechEngine {
                code: "not_attached".to_string(),
                message: "Speech recognition is not available".to_string(),
            })?;
            state.listening = Some(language);
            sink
        };
        info!("🎙️ Listening ({})", language);
        sink.speech(SpeechEvent::Start);
        Ok(())
    }

    async fn stop(&self) -> BotResult<()> {
        self.state.lock()?.listening = None;
        Ok(())
    }

    fn name(&self) -> &str {
        "console"
    }
}
