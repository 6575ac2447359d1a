//! AIVOICY Library
//!
//! Dialogue turn orchestration for the AIVOICY voice assistant: language
//! resolution, robot command dispatch, LLM completion and the coordinator
//! that ties one spoken turn together.

pub mod config;
pub mod coordinator;
pub mod error;
pub mod events;
pub mod i18n;
pub mod language;
pub mod llm;
pub mod robot;
pub mod speech;
pub mod storage;
pub mod tts;

pub use coordinator::{Collaborators, Phase, SessionHandle, TurnPolicy, TurnSnapshot};
pub use error::{BotResult, VoiceBotError};
