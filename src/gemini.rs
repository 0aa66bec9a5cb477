use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::chatbot::Generator;
use crate::error::{BotError, Result};
use crate::types::{MessageRole, Turn};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: MessageRole,
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
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

impl<'a> GenerateContentRequest<'a> {
    fn from_turns(turns: &'a [Turn]) -> Self {
        Self {
            contents: turns
                .iter()
                .map(|turn| Content {
                    role: turn.role,
                    parts: [Part { text: &turn.text }],
                })
                .collect(),
        }
    }
}

impl GenerateContentResponse {
    /// Text of the first candidate, or `None` when there is nothing usable.
    fn into_text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content
            .parts
            .into_iter()
            .filter_map(|part| part.text)
            .collect();

        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

pub struct GeminiClient {
    api_key: String,
    client: reqwest::Client,
    model: String,
}

impl GeminiClient {
    /// Build a client for `model` whose requests give up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns `Reqwest` if the HTTP client cannot be constructed.
    pub fn new(api_key: String, model: String, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            api_key,
            client,
            model,
        })
    }

    fn endpoint(&self) -> String {
        let model = self.model.trim_start_matches("models/");
        format!("{GEMINI_API_BASE}/models/{model}:generateContent")
    }
}

#[async_trait]
impl Generator for GeminiClient {
    async fn generate(&self, turns: &[Turn]) -> Result<Option<String>> {
        debug!("Sending request to Gemini API with {} turns", turns.len());

        let request = GenerateContentRequest::from_turns(turns);

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response
                .text()
                .await
                .unwrap_or_else(|e| format!("Failed to read error response: {e}"));
            return Err(BotError::GeminiApi { status, message });
        }

        let body = response.text().await?;
        let api_response: GenerateContentResponse = serde_json::from_str(&body)
            .map_err(|e| BotError::GeminiResponse(format!("Malformed response body: {e}")))?;

        let reply = api_response.into_text();
        debug!(
            "Received response from Gemini API ({} characters)",
            reply.as_ref().map_or(0, String::len)
        );
        Ok(reply)
    }
}
