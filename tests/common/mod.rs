#![allow(dead_code)]

pub mod mock_llm;
pub mod mock_motion;
pub mod mock_speech;
pub mod mock_tts;

use aivoicy::coordinator::{Collaborators, Phase, SessionHandle, TurnPolicy, TurnSnapshot};
use aivoicy::language::{Language, LanguageCache, LanguageMode};
use aivoicy::llm::CompletionClient;
use aivoicy::robot::{MotionBackend, RobotDispatcher};
use aivoicy::storage::MemoryStore;
use mock_llm::ScriptedModel;
use mock_motion::MockMotion;
use mock_speech::MockSpeech;
use mock_tts::MockTts;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

pub const WAIT: Duration = Duration::from_secs(5);

pub fn manual(language: Language) -> TurnPolicy {
    TurnPolicy {
        mode: LanguageMode::Manual,
        language,
        speak_delay: Duration::ZERO,
        ..TurnPolicy::default()
    }
}

pub fn auto() -> TurnPolicy {
    TurnPolicy {
        mode: LanguageMode::Auto,
        speak_delay: Duration::ZERO,
        ..TurnPolicy::default()
    }
}

/// A live session wired to mock engines
pub struct Harness {
    pub speech: Arc<MockSpeech>,
    pub tts: Arc<MockTts>,
    pub model: Arc<ScriptedModel>,
    pub motion: Arc<MockMotion>,
    pub store: Arc<MemoryStore>,
    pub cache: LanguageCache,
    pub session: SessionHandle,
}

impl Harness {
    pub fn start(policy: TurnPolicy, model: ScriptedModel) -> Self {
        Self::start_with_store(policy, model, Arc::new(MemoryStore::new()))
    }

    pub fn start_with_store(policy: TurnPolicy, model: ScriptedModel, store: Arc<MemoryStore>) -> Self {
        let speech = Arc::new(MockSpeech::new());
        let tts = Arc::new(MockTts::new());
        let model = Arc::new(model);
        let motion = Arc::new(MockMotion::new());
        let cache = LanguageCache::new(store.clone());

        let backend: Arc<dyn MotionBackend> = motion.clone();
        let services = Collaborators {
            speech: speech.clone(),
            tts: tts.clone(),
            completion: CompletionClient::new(model.clone()),
            robot: RobotDispatcher::new(Some(backend)),
            cache: cache.clone(),
        };
        let session = SessionHandle::start(services, policy);

        Self {
            speech,
            tts,
            model,
            motion,
            store,
            cache,
            session,
        }
    }

    /// Open the mic and wait until the recognizer runs
    pub async fn listen(&self) -> TurnSnapshot {
        assert!(self.session.press_mic());
        self.session
            .wait_for(|s| s.phase == Phase::Listening, WAIT)
            .await
            .expect("session never started listening")
    }

    /// Run one full turn and return the state once it is back to Idle
    pub async fn turn(&self, utterance: &str) -> TurnSnapshot {
        let seq = self.listen().await.turn_seq;
        self.speech.say(utterance);
        self.wait_idle(seq).await
    }

    pub async fn wait_idle(&self, seq: u64) -> TurnSnapshot {
        self.session
            .wait_for(|s| s.turn_seq == seq && s.phase == Phase::Idle, WAIT)
            .await
            .expect("turn never returned to idle")
    }
}

/// Runs the `aivoicy` binary against an isolated config
pub struct CliContext {
    pub temp_dir: TempDir,
    pub config_path: PathBuf,
}

impl CliContext {
    /// Config pointing Gemini at `gemini_base_url`, no speak delay
    pub fn new(gemini_base_url: &str) -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("config.json");
        let config = serde_json::json!({
            "gemini": { "base_url": gemini_base_url, "api_key": "test-key", "timeout_secs": 5 },
            "speak_delay_ms": 0,
            "store_path": temp_dir.path().join("store.db"),
            "log_level": "WARN"
        });
        std::fs::write(&config_path, config.to_string()).expect("Failed to write config");
        Self {
            temp_dir,
            config_path,
        }
    }

    /// Feed stdin lines to the binary and collect its output
    pub fn run(&self, args: &[&str], lines: &[&str]) -> Output {
        let bin_path = env!("CARGO_BIN_EXE_aivoicy");
        let mut child = Command::new(bin_path)
            .arg("--config")
            .arg(&self.config_path)
            .args(args)
            .env_remove("GEMINI_API_KEY")
            .env_remove("AIVOICY_ROBOT_URL")
            .env_remove("RUST_LOG")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .expect("Failed to spawn aivoicy");

        {
            let mut stdin = child.stdin.take().expect("stdin");
            for line in lines {
                writeln!(stdin, "{line}").expect("Failed to write stdin");
            }
        }
        child.wait_with_output().expect("Failed to wait for aivoicy")
    }
}
