//! LLM-assisted language detection
//!
//! The model is asked for `{"language": "<tag>", "correctedText": "..."}`.
//! Replies are interpreted through a fixed ladder:
//! 1. `Parsed`    - the JSON object parsed and named a supported language
//! 2. `Heuristic` - a `"language": "<tag>"` pair was found by regex, or the
//!    offline classifier matched the raw transcript
//! 3. `Default`   - nothing matched

use super::classifier::match_rules;
use super::Language;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, warn};

lazy_static! {
    static ref LANGUAGE_FIELD: Regex =
        Regex::new(r#""language"\s*:\s*"([A-Za-z]{2,}(?:[-_][A-Za-z]{2,})?)""#)
            .expect("static regex");
}

/// Outcome of a detection attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Detection {
    Parsed {
        language: Language,
        corrected_text: Option<String>,
    },
    Heuristic {
        language: Language,
    },
    Default,
}

impl Detection {
    pub fn language(&self) -> Language {
        match self {
            Detection::Parsed { language, .. } | Detection::Heuristic { language } => *language,
            Detection::Default => Language::default(),
        }
    }

    /// Transcript correction proposed by the model, if any
    pub fn corrected_text(&self) -> Option<&str> {
        match self {
            Detection::Parsed {
                corrected_text: Some(text),
                ..
            } => Some(text.as_str()),
            _ => None,
        }
    }

    /// True for anything better than the default rung
    pub fn is_match(&self) -> bool {
        !matches!(self, Detection::Default)
    }

    /// Interpret a model reply, falling back to the raw transcript
    pub fn from_reply(reply: &str, transcript: &str) -> Self {
        if let Some(parsed) = parse_json(reply) {
            return parsed;
        }
        if let Some(language) = LANGUAGE_FIELD
            .captures(reply)
            .and_then(|caps| caps.get(1))
            .and_then(|m| Language::from_tag(m.as_str()))
        {
            debug!("🔎 Detection reply matched by pattern: {}", language);
            return Detection::Heuristic { language };
        }
        Self::from_transcript(transcript)
    }

    /// Offline rung used when the model could not be asked
    pub fn from_transcript(transcript: &str) -> Self {
        match match_rules(transcript) {
            Some(language) => Detection::Heuristic { language },
            None => Detection::Default,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DetectionPayload {
    language: String,
    #[serde(default, alias = "corrected_text")]
    corrected_text: Option<String>,
}

fn parse_json(reply: &str) -> Option<Detection> {
    // Models like to wrap JSON in prose or code fences
    let start = reply.find('{')?;
    let end = reply.rfind('}')?;
    if end < start {
        return None;
    }
    let payload: DetectionPayload = match serde_json::from_str(&reply[start..=end]) {
        Ok(payload) => payload,
        Err(e) => {
            warn!("⚠️ Detection reply is not valid JSON: {}", e);
            return None;
        }
    };
    let language = Language::from_tag(&payload.language)?;
    let corrected_text = payload
        .corrected_text
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());
    Some(Detection::Parsed {
        language,
        corrected_text,
    })
}

/// Prompt asking the model to identify the language and fix the transcript
pub fn detection_prompt(transcript: &str) -> String {
    let tags: Vec<&str> = Language::ALL.iter().map(|l| l.tag()).collect();
    format!(
        r#"You are a language identifier for a voice assistant. The text below came from a speech recognizer and may be misheard or romanized.
Identify the spoken language and correct obvious recognition errors, keeping the original script when it is correct.

Text: "{transcript}"

Allowed languages: {}
Respond with ONLY valid JSON in this exact format:
{{"language": "<tag>", "correctedText": "<corrected text>"}}"#,
        tags.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parsed_json() {
        let reply = r#"{"language": "ta-IN", "correctedText": "வணக்கம் எப்படி இருக்கீங்க"}"#;
        let detection = Detection::from_reply(reply, "vanakkam epdi irukinga");
        assert_eq!(detection.language(), Language::Tamil);
        assert_eq!(
            detection.corrected_text(),
            Some("வணக்கம் எப்படி இருக்கீங்க")
        );
    }

    #[test]
    fn test_parsed_json_inside_code_fence() {
        let reply = "Sure!\n```json\n{\"language\": \"si\", \"correctedText\": \"  \"}\n```";
        let detection = Detection::from_reply(reply, "obama");
        assert_eq!(
            detection,
            Detection::Parsed {
                language: Language::Sinhala,
                corrected_text: None
            }
        );
    }

    #[test]
    fn test_broken_json_falls_back_to_pattern() {
        let reply = r#"{"language": "hi-IN", "correctedText": "नमस्ते"#;
        let detection = Detection::from_reply(reply, "hello");
        assert_eq!(
            detection,
            Detection::Heuristic {
                language: Language::Hindi
            }
        );
    }

    #[test]
    fn test_prose_mention_is_not_a_language_field() {
        let detection = Detection::from_reply("language: hi there, I can't tell", "what time is it");
        assert_eq!(detection, Detection::Default);

        let detection = Detection::from_reply(r#"Language = "ta-IN" probably"#, "what time is it");
        assert_eq!(detection, Detection::Default);
    }

    #[test]
    fn test_unknown_language_falls_back_to_transcript() {
        let reply = r#"{"language": "fr-FR", "correctedText": "bonjour"}"#;
        let detection = Detection::from_reply(reply, "vanakkam");
        assert_eq!(
            detection,
            Detection::Heuristic {
                language: Language::Tamil
            }
        );
    }

    #[test]
    fn test_nothing_matches_is_default() {
        let detection = Detection::from_reply("I am not sure.", "what time is it");
        assert_eq!(detection, Detection::Default);
        assert_eq!(detection.language(), Language::English);
        assert!(!detection.is_match());
    }

    #[test]
    fn test_prompt_mentions_transcript_and_tags() {
        let prompt = detection_prompt("ruko");
        assert!(prompt.contains("\"ruko\""));
        assert!(prompt.contains("si-LK"));
        assert!(prompt.contains("correctedText"));
    }
}
