//! AIVOICY - multilingual voice assistant front end
//!
//! Console driver for one conversation session: every stdin line is one
//! spoken utterance. Lines starting with `:` change settings
//! (`:mode auto|manual`, `:lang TAG`).

use aivoicy::config::{self, Config, LanguageSettings};
use aivoicy::coordinator::{Collaborators, Phase, SessionHandle, TurnPolicy};
use aivoicy::language::{Language, LanguageCache, LanguageMode};
use aivoicy::llm::{CompletionClient, GeminiClient};
use aivoicy::robot::RobotDispatcher;
use aivoicy::speech::ConsoleSpeech;
use aivoicy::storage::{KeyValueStore, MemoryStore, SqliteStore};
use aivoicy::tts;
use anyhow::{anyhow, Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const LISTEN_TIMEOUT: Duration = Duration::from_secs(5);
const TURN_TIMEOUT: Duration = Duration::from_secs(90);

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Language mode: auto or manual
    #[arg(long)]
    mode: Option<String>,

    /// Language for manual mode (hi-IN, ta-IN, si-LK, en-US)
    #[arg(short, long)]
    language: Option<String>,

    /// Config file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Keep settings and the language cache in memory only
    #[arg(long)]
    ephemeral: bool,

    /// TTS engine: console or system
    #[arg(long)]
    tts: Option<String>,

    /// Robot motion controller URL
    #[arg(long, env = "AIVOICY_ROBOT_URL")]
    robot_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = args.config.clone().unwrap_or_else(config::config_path);
    let mut config = Config::load_from(&config_path)?;

    // Setup logging
    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.log_level.to_lowercase()))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("🤖 AIVOICY v{} starting...", env!("CARGO_PKG_VERSION"));

    if let Some(engine) = args.tts {
        config.tts_engine = engine;
    }
    if args.robot_url.is_some() {
        config.robot.backend_url = args.robot_url;
    }
    if config.gemini.api_key.is_empty() {
        warn!(
            "⚠️ No Gemini API key ({} or config); replies will be fallbacks",
            config::API_KEY_ENV
        );
    }

    let store: Arc<dyn KeyValueStore> = if args.ephemeral {
        Arc::new(MemoryStore::new())
    } else {
        let path = PathBuf::from(&config.store_path);
        Arc::new(SqliteStore::open(&path).with_context(|| format!("opening {}", path.display()))?)
    };

    // Stored settings win over config; CLI flags win over both and are saved
    let mut settings = LanguageSettings::load(store.as_ref(), LanguageSettings::from(&config)).await;
    let mut changed = false;
    if let Some(mode) = args.mode.as_deref() {
        settings.mode = LanguageMode::parse(mode).ok_or_else(|| anyhow!("unknown mode '{mode}'"))?;
        changed = true;
    }
    if let Some(tag) = args.language.as_deref() {
        settings.language =
            Language::from_tag(tag).ok_or_else(|| anyhow!("unsupported language '{tag}'"))?;
        changed = true;
    }
    if changed {
        settings.save(store.as_ref()).await?;
    }

    let speech = Arc::new(ConsoleSpeech::new());
    let model = Arc::new(GeminiClient::new(&config.gemini)?);
    let services = Collaborators {
        speech: speech.clone(),
        tts: tts::create_engine(&config),
        completion: CompletionClient::new(model),
        robot: RobotDispatcher::from_config(&config.robot)?,
        cache: LanguageCache::new(store.clone()),
    };
    let session = SessionHandle::start(services, TurnPolicy::from(&config).with_settings(settings));

    info!(
        "✅ AIVOICY ready ({} mode, {}) - type what you would say",
        settings.mode.as_str(),
        settings.language
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(command) = line.strip_prefix(':') {
            match apply_setting(command, &mut settings) {
                Ok(()) => {
                    settings.save(store.as_ref()).await?;
                    session.configure(settings.mode, settings.language);
                    println!("⚙️ {} mode, {}", settings.mode.as_str(), settings.language);
                }
                Err(e) => println!("❌ {e}"),
            }
            continue;
        }

        run_turn(&session, &speech, line).await;
    }

    info!("👋 Input closed, ending session");
    session.shutdown().await;
    Ok(())
}

/// Drive one turn: open the mic, feed the utterance, wait for the reply
async fn run_turn(session: &SessionHandle, speech: &ConsoleSpeech, utterance: &str) {
    if !session.press_mic() {
        warn!("Session is gone");
        return;
    }
    let Some(listening) = session
        .wait_for(|s| s.phase == Phase::Listening, LISTEN_TIMEOUT)
        .await
    else {
        if let Some(error) = session.snapshot().last_error {
            println!("❌ {}", error.message);
        }
        return;
    };

    speech.hear(utterance);

    let seq = listening.turn_seq;
    let Some(done) = session
        .wait_for(|s| s.turn_seq == seq && s.phase == Phase::Idle, TURN_TIMEOUT)
        .await
    else {
        warn!("⏱️ Turn {} did not finish in time", seq);
        return;
    };

    if let Some(error) = done.last_error {
        println!("❌ {}", error.message);
        return;
    }
    println!(
        "   🌐 {} | 🤖 {}",
        done.active_language
            .map(|l| l.tag().to_string())
            .unwrap_or_else(|| "-".into()),
        done.robot_status
            .map(|r| r.as_str().to_string())
            .unwrap_or_else(|| "-".into())
    );
}

fn apply_setting(command: &str, settings: &mut LanguageSettings) -> Result<()> {
    let mut parts = command.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some("mode"), Some(value)) => {
            settings.mode =
                LanguageMode::parse(value).ok_or_else(|| anyhow!("unknown mode '{value}'"))?;
        }
        (Some("lang" | "language"), Some(value)) => {
            settings.language =
                Language::from_tag(value).ok_or_else(|| anyhow!("unsupported language '{value}'"))?;
        }
        _ => return Err(anyhow!("usage: :mode auto|manual, :lang TAG")),
    }
    Ok(())
}
