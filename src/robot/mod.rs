//! Robot Command Dispatcher
//!
//! Matches free text against a fixed phrase table and forwards the motion
//! to an optional backend. Dispatch never fails: a missing or unreachable
//! backend degrades to a mock success.

pub mod http;

use crate::config::RobotConfig;
use crate::error::{BotResult, VoiceBotError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub use http::HttpMotionBackend;

/// Motions the robot understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MotionIntent {
    Stop,
    Forward,
    Left,
    Right,
}

impl MotionIntent {
    pub fn as_str(self) -> &'static str {
        match self {
            MotionIntent::Stop => "stop",
            MotionIntent::Forward => "forward",
            MotionIntent::Left => "left",
            MotionIntent::Right => "right",
        }
    }

    fn ok_status(self) -> RobotCommandResult {
        match self {
            MotionIntent::Stop => RobotCommandResult::StopOk,
            MotionIntent::Forward => RobotCommandResult::ForwardOk,
            MotionIntent::Left => RobotCommandResult::LeftOk,
            MotionIntent::Right => RobotCommandResult::RightOk,
        }
    }
}

/// Outcome of a dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RobotCommandResult {
    ForwardOk,
    StopOk,
    LeftOk,
    RightOk,
    Unknown,
    MotionSkipped,
    MotionMockOk,
    MotionError,
}

impl RobotCommandResult {
    pub fn as_str(self) -> &'static str {
        match self {
            RobotCommandResult::ForwardOk => "FORWARD_OK",
            RobotCommandResult::StopOk => "STOP_OK",
            RobotCommandResult::LeftOk => "LEFT_OK",
            RobotCommandResult::RightOk => "RIGHT_OK",
            RobotCommandResult::Unknown => "UNKNOWN",
            RobotCommandResult::MotionSkipped => "MOTION_SKIPPED",
            RobotCommandResult::MotionMockOk => "MOTION_MOCK_OK",
            RobotCommandResult::MotionError => "MOTION_ERROR",
        }
    }
}

impl fmt::Display for RobotCommandResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Phrase table in match order: language (hi, ta, si, en), then intent
/// with stop first. Phrases are lowercase; matching is substring containment.
const PHRASES: &[(MotionIntent, &[&str])] = &[
    // Hindi
    (MotionIntent::Stop, &["रुको", "रुक जाओ", "ruko"]),
    (MotionIntent::Forward, &["आगे बढ़ो", "आगे", "aage badho"]),
    (MotionIntent::Left, &["बाएँ", "बाएं", "baayen"]),
    (MotionIntent::Right, &["दाएँ", "दाएं", "daayen"]),
    // Tamil
    (MotionIntent::Stop, &["நில்", "நிறுத்து", "nillu", "niruthu"]),
    (MotionIntent::Forward, &["முன்னே", "முன்னால்", "munne", "munnadi"]),
    (MotionIntent::Left, &["இடது", "idathu", "idadhu"]),
    (MotionIntent::Right, &["வலது", "valathu", "valadhu"]),
    // Sinhala
    (MotionIntent::Stop, &["නවතින්න", "නවත්වන්න", "nawathinna"]),
    (MotionIntent::Forward, &["ඉදිරියට", "idiriyata"]),
    (MotionIntent::Left, &["වමට", "wamata"]),
    (MotionIntent::Right, &["දකුණට", "dakunata"]),
    // English
    (MotionIntent::Stop, &["stop", "halt"]),
    (MotionIntent::Forward, &["forward", "go ahead", "move ahead"]),
    (MotionIntent::Left, &["turn left", "left"]),
    (MotionIntent::Right, &["turn right", "right"]),
];

/// First table entry contained in the text
pub fn match_intent(text: &str) -> Option<MotionIntent> {
    let text = text.trim().to_lowercase();
    if text.is_empty() {
        return None;
    }
    PHRASES
        .iter()
        .find(|(_, phrases)| phrases.iter().any(|p| text.contains(p)))
        .map(|(intent, _)| *intent)
}

/// Motion controller. Every motion is optional: the default bodies report
/// the backend as unavailable for that motion.
#[async_trait]
pub trait MotionBackend: Send + Sync {
    /// Presence check, run before each motion
    async fn probe(&self) -> bool {
        true
    }

    async fn move_forward(&self) -> BotResult<()> {
        Err(VoiceBotError::BackendUnavailable)
    }

    async fn stop(&self) -> BotResult<()> {
        Err(VoiceBotError::BackendUnavailable)
    }

    async fn turn_left(&self) -> BotResult<()> {
        Err(VoiceBotError::BackendUnavailable)
    }

    async fn turn_right(&self) -> BotResult<()> {
        Err(VoiceBotError::BackendUnavailable)
    }

    fn name(&self) -> &str;
}

/// Routes recognized motions to the backend
#[derive(Clone)]
pub struct RobotDispatcher {
    backend: Option<Arc<dyn MotionBackend>>,
    enabled: bool,
}

impl RobotDispatcher {
    pub fn new(backend: Option<Arc<dyn MotionBackend>>) -> Self {
        Self {
            backend,
            enabled: true,
        }
    }

    /// Build from config; no backend URL means mock mode
    pub fn from_config(config: &RobotConfig) -> BotResult<Self> {
        let backend: Option<Arc<dyn MotionBackend>> = match &config.backend_url {
            Some(url) => Some(Arc::new(HttpMotionBackend::new(url, config.timeout_secs)?)),
            None => None,
        };
        Ok(Self::new(backend).with_enabled(config.enabled))
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Whether a backend is configured at all
    pub fn has_backend(&self) -> bool {
        self.backend.is_some()
    }

    /// Match and execute a motion. Never fails.
    pub async fn dispatch(&self, text: &str) -> RobotCommandResult {
        debug!("🤖 Received motion command: '{}'", text);

        let Some(intent) = match_intent(text) else {
            debug!("❓ Unknown command: '{}'", text);
            return RobotCommandResult::Unknown;
        };

        if !self.enabled {
            info!("Robot motion disabled, skipping {}", intent.as_str());
            return RobotCommandResult::MotionSkipped;
        }

        let Some(backend) = &self.backend else {
            info!("🤖 Mock mode: {}", intent.as_str());
            return RobotCommandResult::MotionMockOk;
        };

        if !backend.probe().await {
            warn!("⚠️ {} not reachable, running in mock mode", backend.name());
            return RobotCommandResult::MotionMockOk;
        }

        let outcome = match intent {
            MotionIntent::Stop => backend.stop().await,
            MotionIntent::Forward => backend.move_forward().await,
            MotionIntent::Left => backend.turn_left().await,
            MotionIntent::Right => backend.turn_right().await,
        };

        match outcome {
            Ok(()) => {
                info!("🤖 Command: {}", intent.as_str());
                intent.ok_status()
            }
            Err(VoiceBotError::BackendUnavailable) => {
                warn!("⚠️ {} cannot {}, mock mode", backend.name(), intent.as_str());
                RobotCommandResult::MotionMockOk
            }
            Err(e) => {
                warn!("❌ Motion backend error: {}", e);
                RobotCommandResult::MotionError
            }
        }
    }
}
