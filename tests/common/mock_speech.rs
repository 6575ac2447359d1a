//! Mock Speech Engine for Testing
//!
//! Lets a test play the recognizer: emit any event sequence and inspect
//! how the coordinator drove the engine.

use aivoicy::error::{BotResult, VoiceBotError};
use aivoicy::events::{EventSink, SpeechEvent};
use aivoicy::language::Language;
use aivoicy::speech::SpeechEngine;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

pub struct MockSpeech {
    sink: Mutex<Option<EventSink>>,
    /// Languages passed to every `start`
    pub started: Mutex<Vec<Language>>,
    pub stops: AtomicUsize,
    /// Answer to the permission prompt
    pub permission: AtomicBool,
    /// Make the next `start` fail
    pub fail_start: AtomicBool,
}

impl MockSpeech {
    pub fn new() -> Self {
        Self {
            sink: Mutex::new(None),
            started: Mutex::new(Vec::new()),
            stops: AtomicUsize::new(0),
            permission: AtomicBool::new(true),
            fail_start: AtomicBool::new(false),
        }
    }

    pub fn emit(&self, event: SpeechEvent) -> bool {
        match self.sink.lock().unwrap().as_ref() {
            Some(sink) => sink.speech(event),
            None => false,
        }
    }

    /// One partial result then the final result
    pub fn say(&self, text: &str) {
        if let Some(first) = text.split_whitespace().next() {
            self.emit(SpeechEvent::Partial {
                text: first.to_string(),
            });
        }
        self.emit(SpeechEvent::Final {
            text: text.to_string(),
        });
        self.emit(SpeechEvent::End);
    }

    pub fn is_attached(&self) -> bool {
        self.sink.lock().unwrap().is_some()
    }

    pub fn started_languages(&self) -> Vec<Language> {
        self.started.lock().unwrap().clone()
    }

    pub fn stop_count(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }
}

impl Default for MockSpeech {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SpeechEngine for MockSpeech {
    fn attach(&self, sink: EventSink) {
        *self.sink.lock().unwrap() = Some(sink);
    }

    fn detach(&self) {
        *self.sink.lock().unwrap() = None;
    }

    async fn request_permission(&self) -> bool {
        self.permission.load(Ordering::SeqCst)
    }

    async fn start(&self, language: Language) -> BotResult<()> {
        if self.fail_start.swap(false, Ordering::SeqCst) {
            return Err(VoiceBotError::SpeechEngine {
                code: "busy".into(),
                message: "Recognizer busy".into(),
            });
        }
        self.started.lock().unwrap().push(language);
        self.emit(SpeechEvent::Start);
        Ok(())
    }

    async fn stop(&self) -> BotResult<()> {
        self.stops.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn name(&self) -> &str {
        "mock"
    }
}
