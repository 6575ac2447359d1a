//! Gemini API client
//!
//! Minimal `generateContent` contract:
//! request  `{"contents":[{"parts":[{"text": prompt}]}]}`
//! response `{"candidates":[{"content":{"parts":[{"text": reply}]}}]}`

use super::LanguageModel;
use crate::config::GeminiConfig;
use crate::error::{BotResult, VoiceBotError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateResponse {
    fn first_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .next()?
            .text
    }
}

/// Handles calls to the Gemini `generateContent` endpoint
#[derive(Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    api_version: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    /// Create new Gemini client from config
    pub fn new(config: &GeminiConfig) -> BotResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| VoiceBotError::Config(format!("HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_version: config.api_version.clone(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
        })
    }

    fn model_url(&self) -> String {
        format!("{}/{}/models/{}", self.base_url, self.api_version, self.model)
    }

    /// Health check - verify the model endpoint is reachable with our key
    pub async fn health_check(&self) -> bool {
        match self
            .client
            .get(self.model_url())
            .query(&[("key", self.api_key.as_str())])
            .timeout(Duration::from_secs(2))
            .send()
            .await
        {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }
}

#[async_trait]
impl LanguageModel for GeminiClient {
    async fn generate(&self, prompt: &str) -> BotResult<String> {
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        debug!("🔗 Sending prompt to Gemini: {}", prompt);
        let response = self
            .client
            .post(format!("{}:generateContent", self.model_url()))
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| VoiceBotError::Network(e.to_string()))?;

        let status = response.status();
        let body_text = response
            .text()
            .await
            .map_err(|e| VoiceBotError::Network(e.to_string()))?;

        if !status.is_success() {
            warn!("❌ Gemini API Error ({}): {}", status, body_text);
            return Err(VoiceBotError::Http {
                status: status.as_u16(),
                body: body_text,
            });
        }

        debug!("🧠 Gemini raw body: {}", body_text);

        let parsed: GenerateResponse = serde_json::from_str(&body_text).map_err(|e| {
            warn!("❌ Failed to deserialize Gemini response: {}", e);
            VoiceBotError::Parse(e.to_string())
        })?;

        parsed
            .first_text()
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or(VoiceBotError::EmptyResponse)
    }

    fn name(&self) -> &str {
        "gemini"
    }
}
