//! Console TTS: prints replies instead of speaking them

use super::TtsEngine;
use crate::error::BotResult;
use crate::events::{EventSink, TtsEvent};
use crate::language::Language;
use async_trait::async_trait;
use std::sync::Mutex;

#[derive(Debug, Default)]
struct ConsoleState {
    sink: Option<EventSink>,
    language: Language,
}

#[derive(Debug, Default)]
pub struct ConsoleTts {
    state: Mutex<ConsoleState>,
}

impl ConsoleTts {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TtsEngine for ConsoleTts {
    fn attach(&self, sink: EventSink) {
        if let Ok(mut state) = self.state.lock() {
            state.sink = Some(sink);
        }
    }

    fn detach(&self) {
        if let Ok(mut state) = self.state.lock() {
            state.sink = None;
        }
    }

    async fn set_language(&self, language: Language) -> BotResult<()> {
        self.state.lock()?.language = language;
        Ok(())
    }

    async fn stop(&self) -> BotResult<()> {
        Ok(())
    }

    async fn speak(&self, text: &str) -> BotResult<()> {
        let (language, sink) = {
            let state = self.state.lock()?;
            (state.language, state.sink.clone())
        };
        println!("🔊 [{}] {}", language, text);
        if let Some(sink) = sink {
            sink.tts(TtsEvent::Finished);
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "console"
    }
}
