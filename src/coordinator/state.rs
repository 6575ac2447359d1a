//! State types for the turn coordinator

use crate::language::{CacheEntry, Language, LanguageSource};
use crate::robot::RobotCommandResult;

/// Where the current turn is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Listening,
    Resolving,
    Dispatching,
    AwaitingCompletion,
    Speaking,
    Error,
}

impl Phase {
    /// Phases in which the active language must be set
    pub fn requires_language(self) -> bool {
        matches!(
            self,
            Phase::Dispatching | Phase::AwaitingCompletion | Phase::Speaking
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnErrorKind {
    PermissionDenied,
    SpeechEngine { code: String },
}

/// User-visible failure of the last turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnError {
    pub kind: TurnErrorKind,
    pub message: String,
}

/// Mutable state of the live turn, owned by the coordinator task
#[derive(Debug, Default)]
pub(crate) struct TurnState {
    pub phase: Phase,
    pub seq: u64,
    pub raw_transcript: String,
    pub reply: String,
    pub active_language: Option<Language>,
    pub language_source: Option<LanguageSource>,
    pub robot_status: Option<RobotCommandResult>,
    pub last_error: Option<TurnError>,
    pub listening: bool,
    pub loading: bool,
    /// Recognizer ended without a final result yet; a late final still counts
    pub awaiting_final: bool,
    /// The recognizer confirmed this turn's start; earlier results belong to an older turn
    pub recognizer_started: bool,
    /// The reply was handed to TTS
    pub tts_started: bool,
    /// Cache entry read when the turn started
    pub cached: Option<CacheEntry>,
}

/// Read-only view published after every transition
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TurnSnapshot {
    pub phase: Phase,
    pub turn_seq: u64,
    pub transcript: String,
    pub reply: String,
    pub active_language: Option<Language>,
    pub language_source: Option<LanguageSource>,
    pub robot_status: Option<RobotCommandResult>,
    pub last_error: Option<TurnError>,
    pub listening: bool,
    pub loading: bool,
}

impl From<&TurnState> for TurnSnapshot {
    fn from(state: &TurnState) -> Self {
        Self {
            phase: state.phase,
            turn_seq: state.seq,
            transcript: state.raw_transcript.clone(),
            reply: state.reply.clone(),
            active_language: state.active_language,
            language_source: state.language_source,
            robot_status: state.robot_status,
            last_error: state.last_error.clone(),
            listening: state.listening,
            loading: state.loading,
        }
    }
}
