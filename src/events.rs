//! Session events
//!
//! Everything that can happen to a screen session arrives as a
//! [`SessionEvent`] on one channel. Engines never hold a reference to the
//! coordinator; they get an [`EventSink`] when the session attaches them
//! and lose it on detach. Once the coordinator is gone every send fails
//! quietly.

use crate::language::{Language, LanguageMode};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::debug;

/// Signals raised by the speech recognizer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SpeechEvent {
    Start,
    End,
    Partial { text: String },
    Final { text: String },
    Error { code: String, message: String },
}

/// Signals raised by the speech synthesizer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TtsEvent {
    Finished,
}

/// Inbound events of a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Mic button tapped: starts listening, or stops when already listening
    MicPressed,
    /// Start listening; ignored while already listening
    StartListening,
    /// Explicit stop request
    Stop,
    Speech(SpeechEvent),
    Tts(TtsEvent),
    /// Language settings changed; applies from the next turn
    Configure {
        mode: LanguageMode,
        language: Language,
    },
    /// End the session and detach all engines
    Shutdown,
}

/// Cloneable handle engines use to report events
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: mpsc::UnboundedSender<SessionEvent>,
}

impl EventSink {
    pub fn new(tx: mpsc::UnboundedSender<SessionEvent>) -> Self {
        Self { tx }
    }

    /// Report a recognizer event. Returns false once the session is gone.
    pub fn speech(&self, event: SpeechEvent) -> bool {
        self.send(SessionEvent::Speech(event))
    }

    /// Report a synthesizer event. Returns false once the session is gone.
    pub fn tts(&self, event: TtsEvent) -> bool {
        self.send(SessionEvent::Tts(event))
    }

    pub fn send(&self, event: SessionEvent) -> bool {
        match self.tx.send(event) {
            Ok(()) => true,
            Err(e) => {
                debug!("Dropping event for closed session: {:?}", e.0);
                false
            }
        }
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}
