//! Mock TTS Engine for Testing
//!
//! Records every call in order for verification.

use aivoicy::error::{BotResult, VoiceBotError};
use aivoicy::events::{EventSink, TtsEvent};
use aivoicy::language::Language;
use aivoicy::tts::TtsEngine;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TtsCall {
    Stop,
    SetLanguage(Language),
    Speak(String),
}

/// Mock TTS engine that records spoken text
#[derive(Debug)]
pub struct MockTts {
    sink: Mutex<Option<EventSink>>,
    pub calls: Mutex<Vec<TtsCall>>,
    /// Report `Finished` right after each speak
    pub auto_finish: AtomicBool,
    /// Simulate failure on speak
    pub should_fail: AtomicBool,
}

impl MockTts {
    pub fn new() -> Self {
        Self {
            sink: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
            auto_finish: AtomicBool::new(true),
            should_fail: AtomicBool::new(false),
        }
    }

    pub fn calls(&self) -> Vec<TtsCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Spoken texts with the language selected at the time
    pub fn get_spoken(&self) -> Vec<(Option<Language>, String)> {
        let mut language = None;
        let mut spoken = Vec::new();
        for call in self.calls() {
            match call {
                TtsCall::SetLanguage(l) => language = Some(l),
                TtsCall::Speak(text) => spoken.push((language, text)),
                TtsCall::Stop => {}
            }
        }
        spoken
    }

    /// Check if a phrase was spoken
    pub fn was_spoken(&self, text: &str) -> bool {
        self.get_spoken().iter().any(|(_, s)| s.contains(text))
    }

    /// Report playback finished, as a real engine does later
    pub fn finish(&self) -> bool {
        match self.sink.lock().unwrap().as_ref() {
            Some(sink) => sink.tts(TtsEvent::Finished),
            None => false,
        }
    }
}

impl Default for MockTts {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TtsEngine for MockTts {
    fn attach(&self, sink: EventSink) {
        *self.sink.lock().unwrap() = Some(sink);
    }

    fn detach(&self) {
        *self.sink.lock().unwrap() = None;
    }

    async fn set_language(&self, language: Language) -> BotResult<()> {
        self.calls.lock().unwrap().push(TtsCall::SetLanguage(language));
        Ok(())
    }

    async fn stop(&self) -> BotResult<()> {
        self.calls.lock().unwrap().push(TtsCall::Stop);
        Ok(())
    }

    async fn speak(&self, text: &str) -> BotResult<()> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(VoiceBotError::Tts("Mock TTS failure".into()));
        }
        self.calls.lock().unwrap().push(TtsCall::Speak(text.to_string()));
        if self.auto_finish.load(Ordering::SeqCst) {
            self.finish();
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "mock"
    }
}
