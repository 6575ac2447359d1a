//! System TTS engine (speech-dispatcher or espeak-ng)

use super::TtsEngine;
use crate::error::{BotResult, VoiceBotError};
use crate::events::{EventSink, TtsEvent};
use crate::language::Language;
use async_trait::async_trait;
use std::process::Stdio;
use std::sync::Mutex;
use tokio::process::{Child, Command};
use tokio::sync::oneshot;
use tracing::{debug, warn};

#[derive(Debug, Default)]
struct SystemState {
    sink: Option<EventSink>,
    language: Language,
    /// Cancels the utterance currently playing
    cancel: Option<oneshot::Sender<()>>,
}

#[derive(Debug, Default)]
pub struct SystemEngine {
    state: Mutex<SystemState>,
}

impl SystemEngine {
    pub fn new() -> Self {
        Self::default()
    }

    fn spawn_player(language: Language, text: &str) -> BotResult<Child> {
        // spd-say only returns after playback with --wait
        let spd = Command::new("spd-say")
            .args(["--wait", "-l", language.code()])
            .arg(text)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn();
        if let Ok(child) = spd {
            return Ok(child);
        }

        Command::new("espeak-ng")
            .args(["-v", language.code()])
            .arg(text)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|_| {
                VoiceBotError::Tts("No system TTS command found (tried spd-say, espeak-ng)".into())
            })
    }
}

#[async_trait]
impl TtsEngine for SystemEngine {
    fn attach(&self, sink: EventSink) {
        if let Ok(mut state) = self.state.lock() {
            state.sink = Some(sink);
        }
    }

    fn detach(&self) {
        if let Ok(mut state) = self.state.lock() {
            state.sink = None;
            if let Some(cancel) = state.cancel.take() {
                let _ = cancel.send(());
            }
        }
    }

    async fn set_language(&self, language: Language) -> BotResult<()> {
        self.state.lock()?.language = language;
        Ok(())
    }

    async fn stop(&self) -> BotResult<()> {
        if let Some(cancel) = self.state.lock()?.cancel.take() {
            debug!("System TTS: cancelling current utterance");
            let _ = cancel.send(());
        }
        Ok(())
    }

    async fn speak(&self, text: &str) -> BotResult<()> {
        let (tx, rx) = oneshot::channel();
        let (language, sink) = {
            let mut state = self.state.lock()?;
            if let Some(previous) = state.cancel.replace(tx) {
                let _ = previous.send(());
            }
            (state.language, state.sink.clone())
        };

        debug!("System speaking ({}): {}", language, text);
        let mut child = Self::spawn_player(language, text)?;

        tokio::spawn(async move {
            tokio::select! {
                status = child.wait() => {
                    if let Err(e) = status {
                        warn!("⚠️ System TTS process failed: {}", e);
                    }
                    if let Some(sink) = sink {
                        sink.tts(TtsEvent::Finished);
                    }
                }
                _ = rx => {
                    let _ = child.kill().await;
                }
            }
        });
        Ok(())
    }

    fn name(&self) -> &str {
        "system"
    }
}
