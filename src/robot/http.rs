//! HTTP motion controller backend
//!
//! `POST {url}/motion` with `{"command": "forward" | "stop" | "left" | "right"}`,
//! presence checked with `GET {url}/health`.

use super::{MotionBackend, MotionIntent};
use crate::error::{BotResult, VoiceBotError};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct HttpMotionBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpMotionBackend {
    pub fn new(base_url: &str, timeout_secs: u64) -> BotResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| VoiceBotError::Config(format!("HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn send(&self, intent: MotionIntent) -> BotResult<()> {
        debug!("🤖 POST {}/motion {}", self.base_url, intent.as_str());
        let response = self
            .client
            .post(format!("{}/motion", self.base_url))
            .json(&serde_json::json!({ "command": intent }))
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(VoiceBotError::Http {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            })
        }
    }
}

#[async_trait]
impl MotionBackend for HttpMotionBackend {
    async fn probe(&self) -> bool {
        match self
            .client
            .get(format!("{}/health", self.base_url))
            .timeout(Duration::from_secs(1))
            .send()
            .await
        {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    async fn move_forward(&self) -> BotResult<()> {
        self.send(MotionIntent::Forward).await
    }

    async fn stop(&self) -> BotResult<()> {
        self.send(MotionIntent::Stop).await
    }

    async fn turn_left(&self) -> BotResult<()> {
        self.send(MotionIntent::Left).await
    }

    async fn turn_right(&self) -> BotResult<()> {
        self.send(MotionIntent::Right).await
    }

    fn name(&self) -> &str {
        "http-motion"
    }
}
