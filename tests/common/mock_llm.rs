//! Mock Language Model for Testing
//!
//! Replays a queue of scripted replies (optionally delayed) and records
//! every prompt. Detection prompts are told apart from reply prompts so a
//! test can assert which calls happened.

use aivoicy::error::{BotResult, VoiceBotError};
use aivoicy::llm::LanguageModel;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

/// Marker present in every language detection prompt
const DETECTION_MARKER: &str = "language identifier";

struct Step {
    delay: Duration,
    outcome: BotResult<String>,
}

pub struct ScriptedModel {
    steps: Mutex<VecDeque<Step>>,
    /// Reply once the script is exhausted
    default_reply: String,
    pub prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    pub fn new(default_reply: &str) -> Self {
        Self {
            steps: Mutex::new(VecDeque::new()),
            default_reply: default_reply.to_string(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn then_ok(self, reply: &str) -> Self {
        self.push(Duration::ZERO, Ok(reply.to_string()))
    }

    pub fn then_delayed(self, delay: Duration, reply: &str) -> Self {
        self.push(delay, Ok(reply.to_string()))
    }

    pub fn then_err(self, error: VoiceBotError) -> Self {
        self.push(Duration::ZERO, Err(error))
    }

    fn push(self, delay: Duration, outcome: BotResult<String>) -> Self {
        self.steps.lock().unwrap().push_back(Step { delay, outcome });
        self
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn detection_calls(&self) -> usize {
        self.prompts()
            .iter()
            .filter(|p| p.contains(DETECTION_MARKER))
            .count()
    }

    pub fn reply_prompts(&self) -> Vec<String> {
        self.prompts()
            .into_iter()
            .filter(|p| !p.contains(DETECTION_MARKER))
            .collect()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn generate(&self, prompt: &str) -> BotResult<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        let step = self.steps.lock().unwrap().pop_front();
        match step {
            Some(step) => {
                if !step.delay.is_zero() {
                    tokio::time::sleep(step.delay).await;
                }
                step.outcome
            }
            None => Ok(self.default_reply.clone()),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
