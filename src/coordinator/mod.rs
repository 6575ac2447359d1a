//! Turn Coordinator
//!
//! One coordinator task owns the state of a screen session and drives each
//! turn: listen, resolve the language, dispatch the robot motion and the
//! completion in parallel, then speak the reply. Engines report through the
//! session's event channel; background work reports back on an internal
//! channel tagged with the turn sequence number, so results of an abandoned
//! turn are dropped instead of overwriting a newer one.

mod session;
mod state;

pub use session::SessionHandle;
pub use state::{Phase, TurnError, TurnErrorKind, TurnSnapshot};

use crate::config::{Config, LanguageSettings};
use crate::error::VoiceBotError;
use crate::events::{SessionEvent, SpeechEvent, TtsEvent};
use crate::i18n::{self, Message};
use crate::language::{Language, LanguageCache, LanguageMode, LanguageSource};
use crate::llm::{CompletionClient, CompletionResult};
use crate::robot::{RobotCommandResult, RobotDispatcher};
use crate::speech::SpeechEngine;
use crate::tts::TtsEngine;
use chrono::Utc;
use futures::future;
use state::TurnState;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

/// Services a session talks to
#[derive(Clone)]
pub struct Collaborators {
    pub speech: Arc<dyn SpeechEngine>,
    pub tts: Arc<dyn TtsEngine>,
    pub completion: CompletionClient,
    pub robot: RobotDispatcher,
    pub cache: LanguageCache,
}

/// Per-session knobs
#[derive(Debug, Clone)]
pub struct TurnPolicy {
    pub mode: LanguageMode,
    pub language: Language,
    pub cache_ttl: Duration,
    pub stale_cache_fallback: bool,
    pub await_tts_finish: bool,
    pub speak_delay: Duration,
}

impl TurnPolicy {
    pub fn with_settings(mut self, settings: LanguageSettings) -> Self {
        self.mode = settings.mode;
        self.language = settings.language;
        self
    }
}

impl Default for TurnPolicy {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for TurnPolicy {
    fn from(config: &Config) -> Self {
        Self {
            mode: config.language_mode,
            language: config.selected_language,
            cache_ttl: config.cache_ttl(),
            stale_cache_fallback: config.stale_cache_fallback,
            await_tts_finish: config.await_tts_finish,
            speak_delay: config.speak_delay(),
        }
    }
}

/// Outcome of language resolution for one turn
#[derive(Debug, Clone)]
struct Resolution {
    language: Language,
    source: LanguageSource,
    corrected_text: Option<String>,
    /// Write the language back to the cache when the turn accepts it
    persist: bool,
}

/// Results of background work, tagged with the turn they belong to
#[derive(Debug)]
enum TurnUpdate {
    Resolved {
        seq: u64,
        resolution: Resolution,
    },
    Completed {
        seq: u64,
        reply: CompletionResult,
        robot: RobotCommandResult,
    },
    /// Speak delay elapsed
    Speak { seq: u64 },
}

pub struct TurnCoordinator {
    services: Collaborators,
    policy: TurnPolicy,
    state: TurnState,
    updates_tx: mpsc::UnboundedSender<TurnUpdate>,
    updates_rx: mpsc::UnboundedReceiver<TurnUpdate>,
    snapshot_tx: watch::Sender<TurnSnapshot>,
}

impl TurnCoordinator {
    fn new(
        services: Collaborators,
        policy: TurnPolicy,
        snapshot_tx: watch::Sender<TurnSnapshot>,
    ) -> Self {
        let (updates_tx, updates_rx) = mpsc::unbounded_channel();
        Self {
            services,
            policy,
            state: TurnState::default(),
            updates_tx,
            updates_rx,
            snapshot_tx,
        }
    }

    /// Event loop; returns after `Shutdown` or once every sender is gone
    async fn run(mut self, mut events: mpsc::UnboundedReceiver<SessionEvent>) {
        info!(
            "🗣️ Session started (mode={}, language={})",
            self.policy.mode.as_str(),
            self.policy.language
        );
        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Some(SessionEvent::Shutdown) | None => break,
                    Some(event) => self.handle_event(event).await,
                },
                Some(update) = self.updates_rx.recv() => self.handle_update(update).await,
            }
        }
        self.teardown().await;
    }

    async fn handle_event(&mut self, event: SessionEvent) {
        debug!("📥 {:?} in {:?}", event, self.state.phase);
        match event {
            SessionEvent::MicPressed => {
                if self.state.phase == Phase::Listening {
                    self.stop_listening().await;
                } else {
                    self.start_listening().await;
                }
            }
            SessionEvent::StartListening => self.start_listening().await,
            SessionEvent::Stop => self.stop_listening().await,
            SessionEvent::Speech(speech) => self.on_speech(speech).await,
            SessionEvent::Tts(TtsEvent::Finished) => {
                if self.state.phase == Phase::Speaking && self.state.tts_started {
                    self.state.phase = Phase::Idle;
                    self.publish();
                }
            }
            SessionEvent::Configure { mode, language } => {
                info!("🌐 Language settings: mode={} language={}", mode.as_str(), language);
                self.policy.mode = mode;
                self.policy.language = language;
            }
            SessionEvent::Shutdown => {}
        }
    }

    async fn on_speech(&mut self, event: SpeechEvent) {
        match event {
            SpeechEvent::Start => {
                self.state.recognizer_started = true;
                if self.state.last_error.take().is_some() {
                    self.publish();
                }
            }
            SpeechEvent::Partial { text } => {
                if self.hearing() && !text.trim().is_empty() {
                    self.state.raw_transcript = text;
                    self.publish();
                }
            }
            SpeechEvent::Final { text } => {
                let accepted = self.hearing()
                    || (self.state.phase == Phase::Idle && self.state.awaiting_final);
                if !accepted {
                    debug!("Ignoring final result outside a listening turn: '{}'", text);
                    return;
                }
                if text.trim().is_empty() {
                    return;
                }
                self.state.raw_transcript = text;
                self.state.listening = false;
                self.state.awaiting_final = false;
                self.begin_resolving().await;
            }
            SpeechEvent::End => {
                if self.state.phase == Phase::Listening && !self.state.recognizer_started {
                    debug!("Ignoring end of a superseded recognizer session");
                    return;
                }
                self.state.listening = false;
                if self.state.phase != Phase::Listening {
                    self.publish();
                } else if self.state.raw_transcript.trim().is_empty() {
                    self.state.phase = Phase::Idle;
                    self.state.awaiting_final = true;
                    self.publish();
                } else {
                    self.begin_resolving().await;
                }
            }
            SpeechEvent::Error { code, message } => {
                let message = self.speech_error_message(&code, &message);
                warn!("❌ Speech engine error [{}]: {}", code, message);
                self.fail(TurnError {
                    kind: TurnErrorKind::SpeechEngine { code },
                    message,
                })
                .await;
            }
        }
    }

    /// Start a new turn. A turn still in flight is superseded.
    async fn start_listening(&mut self) {
        if self.state.phase == Phase::Listening {
            return;
        }

        if self.state.phase == Phase::Speaking {
            if let Err(e) = self.services.tts.stop().await {
                warn!("⚠️ Could not stop TTS: {}", e);
            }
            self.state.phase = Phase::Idle;
        }

        if !self.services.speech.request_permission().await {
            warn!("🚫 Microphone permission denied");
            let message = i18n::tr(self.policy.language, Message::PermissionDenied).to_string();
            self.fail(TurnError {
                kind: TurnErrorKind::PermissionDenied,
                message,
            })
            .await;
            return;
        }

        self.state.cached = match self.policy.mode {
            LanguageMode::Auto => self.services.cache.get().await,
            LanguageMode::Manual => None,
        };
        let listen_in = self.listening_language();

        let state = &mut self.state;
        state.seq += 1;
        state.phase = Phase::Listening;
        state.raw_transcript.clear();
        state.reply.clear();
        state.active_language = None;
        state.language_source = None;
        state.robot_status = None;
        state.last_error = None;
        state.listening = true;
        state.loading = false;
        state.awaiting_final = false;
        state.recognizer_started = false;
        state.tts_started = false;
        info!("🎤 Turn {} listening ({})", state.seq, listen_in);

        if let Err(e) = self.services.speech.start(listen_in).await {
            let (code, message) = match e {
                VoiceBotError::SpeechEngine { code, message } => (code, message),
                other => ("start_failed".to_string(), other.to_string()),
            };
            let message = self.speech_error_message(&code, &message);
            warn!("❌ Could not start recognizer: {}", message);
            self.fail(TurnError {
                kind: TurnErrorKind::SpeechEngine { code },
                message,
            })
            .await;
            return;
        }
        self.publish();
    }

    /// Explicit stop. A no-op unless listening or speaking.
    async fn stop_listening(&mut self) {
        match self.state.phase {
            Phase::Listening => {
                if let Err(e) = self.services.speech.stop().await {
                    warn!("⚠️ Could not stop recognizer: {}", e);
                }
                self.state.listening = false;
                if self.state.raw_transcript.trim().is_empty() {
                    self.state.phase = Phase::Idle;
                    self.state.awaiting_final = true;
                    self.publish();
                } else {
                    self.begin_resolving().await;
                }
            }
            Phase::Speaking => {
                if let Err(e) = self.services.tts.stop().await {
                    warn!("⚠️ Could not stop TTS: {}", e);
                }
                self.state.phase = Phase::Idle;
                self.publish();
            }
            phase => debug!("Stop ignored in {:?}", phase),
        }
    }

    async fn begin_resolving(&mut self) {
        self.state.phase = Phase::Resolving;
        self.state.loading = true;
        self.state.reply = i18n::tr(self.policy.language, Message::Thinking).to_string();
        self.publish();

        let seq = self.state.seq;
        if self.policy.mode == LanguageMode::Manual {
            let resolution = Resolution {
                language: self.policy.language,
                source: LanguageSource::Manual,
                corrected_text: None,
                persist: false,
            };
            self.apply_resolution(seq, resolution).await;
            return;
        }

        if let Some(entry) = &self.state.cached {
            if entry.is_fresh(Utc::now(), self.policy.cache_ttl) {
                debug!("🗂️ Reusing cached language {}", entry.language);
                let resolution = Resolution {
                    language: entry.language,
                    source: LanguageSource::Cached,
                    corrected_text: None,
                    persist: false,
                };
                self.apply_resolution(seq, resolution).await;
                return;
            }
        }

        let completion = self.services.completion.clone();
        let transcript = self.state.raw_transcript.clone();
        let stale = self
            .state
            .cached
            .as_ref()
            .filter(|_| self.policy.stale_cache_fallback)
            .map(|entry| entry.language);
        let tx = self.updates_tx.clone();
        tokio::spawn(async move {
            let detection = completion.detect_language(&transcript).await;
            let resolution = match (detection.is_match(), stale) {
                (false, Some(language)) => Resolution {
                    language,
                    source: LanguageSource::StaleCache,
                    corrected_text: None,
                    persist: false,
                },
                (matched, _) => Resolution {
                    language: detection.language(),
                    source: LanguageSource::Detected,
                    corrected_text: detection.corrected_text().map(str::to_string),
                    persist: matched,
                },
            };
            let _ = tx.send(TurnUpdate::Resolved { seq, resolution });
        });
    }

    async fn handle_update(&mut self, update: TurnUpdate) {
        match update {
            TurnUpdate::Resolved { seq, resolution } => self.apply_resolution(seq, resolution).await,
            TurnUpdate::Completed { seq, reply, robot } => {
                if !self.is_current(seq, Phase::AwaitingCompletion) {
                    debug!("🗑️ Dropping reply of stale turn {}", seq);
                    return;
                }
                self.finish_turn(reply, robot).await;
            }
            TurnUpdate::Speak { seq } => {
                if self.is_current(seq, Phase::Speaking) {
                    self.speak_reply().await;
                } else {
                    debug!("🗑️ Dropping speech of stale turn {}", seq);
                }
            }
        }
    }

    async fn apply_resolution(&mut self, seq: u64, resolution: Resolution) {
        if !self.is_current(seq, Phase::Resolving) {
            debug!("🗑️ Dropping language of stale turn {}", seq);
            return;
        }

        info!(
            "🌐 Turn {} language {} ({:?})",
            seq, resolution.language, resolution.source
        );
        if let Some(text) = resolution.corrected_text.filter(|t| !t.trim().is_empty()) {
            debug!("✏️ Transcript corrected: '{}' -> '{}'", self.state.raw_transcript, text);
            self.state.raw_transcript = text;
        }
        if resolution.persist {
            self.services.cache.set(resolution.language, Utc::now()).await;
        }

        let language = resolution.language;
        self.state.active_language = Some(language);
        self.state.language_source = Some(resolution.source);
        self.state.phase = Phase::Dispatching;
        self.publish();

        let robot = self.services.robot.clone();
        let completion = self.services.completion.clone();
        let transcript = self.state.raw_transcript.clone();
        let tx = self.updates_tx.clone();
        tokio::spawn(async move {
            let (robot, reply) = future::join(
                robot.dispatch(&transcript),
                completion.complete_detailed(&transcript, language),
            )
            .await;
            let _ = tx.send(TurnUpdate::Completed { seq, reply, robot });
        });

        self.state.phase = Phase::AwaitingCompletion;
        self.publish();
    }

    async fn finish_turn(&mut self, reply: CompletionResult, robot: RobotCommandResult) {
        match robot {
            RobotCommandResult::MotionError => warn!("🤖 Robot status: {}", robot),
            _ => info!("🤖 Robot status: {}", robot),
        }
        self.state.robot_status = Some(robot);
        self.state.reply = reply.text;
        self.state.loading = false;
        self.state.listening = false;
        self.state.phase = Phase::Speaking;
        self.publish();

        if self.policy.speak_delay.is_zero() {
            self.speak_reply().await;
            return;
        }

        // Keep handling events while the delay runs
        let seq = self.state.seq;
        let delay = self.policy.speak_delay;
        let tx = self.updates_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(TurnUpdate::Speak { seq });
        });
    }

    async fn speak_reply(&mut self) {
        let language = self.state.active_language.unwrap_or(self.policy.language);
        self.state.tts_started = true;

        let tts = &self.services.tts;
        if let Err(e) = tts.stop().await {
            warn!("⚠️ Could not stop TTS: {}", e);
        }
        if let Err(e) = tts.set_language(language).await {
            warn!("⚠️ TTS language {} unavailable: {}", language, e);
        }
        let spoken = match tts.speak(&self.state.reply).await {
            Ok(()) => true,
            Err(e) => {
                warn!("❌ TTS failed: {}", e);
                false
            }
        };

        if !spoken || !self.policy.await_tts_finish {
            self.state.phase = Phase::Idle;
            self.publish();
        }
    }

    /// Error, then straight back to Idle. The transcript is kept.
    async fn fail(&mut self, error: TurnError) {
        if self.state.phase == Phase::Speaking {
            if let Err(e) = self.services.tts.stop().await {
                warn!("⚠️ Could not stop TTS: {}", e);
            }
        }
        self.state.last_error = Some(error);
        self.state.listening = false;
        self.state.loading = false;
        self.state.awaiting_final = false;
        self.state.phase = Phase::Error;
        self.publish();
        self.state.phase = Phase::Idle;
        self.publish();
    }

    /// Listening, and the recognizer has confirmed this turn
    fn hearing(&self) -> bool {
        self.state.phase == Phase::Listening && self.state.recognizer_started
    }

    fn is_current(&self, seq: u64, phase: Phase) -> bool {
        seq == self.state.seq && self.state.phase == phase
    }

    /// Recognizer language: a fresh cached detection wins in auto mode
    fn listening_language(&self) -> Language {
        match (self.policy.mode, &self.state.cached) {
            (LanguageMode::Auto, Some(entry)) if entry.is_fresh(Utc::now(), self.policy.cache_ttl) => {
                entry.language
            }
            _ => self.policy.language,
        }
    }

    fn speech_error_message(&self, code: &str, message: &str) -> String {
        let language = self.state.active_language.unwrap_or(self.policy.language);
        let lowered = format!("{} {}", code, message).to_lowercase();
        if lowered.contains("no_match") || lowered.contains("no match") {
            i18n::tr(language, Message::NoMatch).to_string()
        } else if message.trim().is_empty() {
            i18n::tr(language, Message::SpeechError).to_string()
        } else {
            message.to_string()
        }
    }

    fn publish(&self) {
        debug_assert!(
            !self.state.phase.requires_language() || self.state.active_language.is_some(),
            "{:?} without an active language",
            self.state.phase
        );
        self.snapshot_tx.send_replace(TurnSnapshot::from(&self.state));
    }

    async fn teardown(&mut self) {
        if self.state.listening {
            if let Err(e) = self.services.speech.stop().await {
                debug!("Recognizer stop during teardown: {}", e);
            }
        }
        if let Err(e) = self.services.tts.stop().await {
            debug!("TTS stop during teardown: {}", e);
        }
        self.services.speech.detach();
        self.services.tts.detach();

        self.state.phase = Phase::Idle;
        self.state.listening = false;
        self.state.loading = false;
        self.publish();
        info!("🔌 Session ended after {} turn(s)", self.state.seq);
    }
}
