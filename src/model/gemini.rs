//! Gemini REST client.
//!
//! Talks to the `generateContent` endpoint of the Google Generative
//! Language API. Only the request and response fields this tool actually
//! uses are modelled; unknown response fields are ignored by serde.

use crate::error::StudyBuddyError;
use crate::model::{GenerationOptions, TextGenerator};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::debug;

/// Request timeout. Large notes plus a flash-tier model stay well under
/// this; anything slower is effectively hung from the user's point of view.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Client for Google's Gemini text generation API.
pub struct GeminiClient {
    model: String,
    base_url: String,
    api_key: String,
    client: Client,
}

impl GeminiClient {
    /// Create a client for the given model and endpoint.
    ///
    /// The API key is embedded into request URLs at call time and is never
    /// logged.
    pub fn new(
        model: impl Into<String>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, StudyBuddyError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| StudyBuddyError::Internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            model: model.into(),
            base_url: base_url.into(),
            api_key: api_key.into(),
            client,
        })
    }

    /// Model identifier this client sends requests to.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Full `generateContent` URL.
    ///
    /// The key rides in the query string, so the URL itself must never
    /// reach a log line.
    fn request_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        )
    }
}

impl fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiClient")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, StudyBuddyError> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                }],
            }],
            generation_config: Some(GenerationConfig {
                temperature: options.temperature,
            }),
        };

        debug!(
            model = %self.model,
            prompt_chars = prompt.chars().count(),
            temperature = options.temperature,
            "sending generateContent request"
        );

        let response = self
            .client
            .post(self.request_url())
            .json(&request)
            .send()
            .await
            .map_err(|e| StudyBuddyError::ModelRequest {
                message: format!("network error: {e}"),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(StudyBuddyError::ModelRequest {
                message: format!("HTTP {status}: {error_text}"),
            });
        }

        let api_response: GenerateContentResponse =
            response
                .json()
                .await
                .map_err(|e| StudyBuddyError::ModelRequest {
                    message: format!("unparseable response: {e}"),
                })?;

        if let Some(usage) = &api_response.usage_metadata {
            debug!(
                prompt_tokens = usage.prompt_token_count.unwrap_or(0),
                output_tokens = usage.candidates_token_count.unwrap_or(0),
                "generateContent succeeded"
            );
        }

        extract_text(api_response)
    }
}

/// Pull the generated text out of a response, or explain why there is none.
///
/// Safety blocks and truncations surface here as a missing or empty text
/// part; the finish reason is included so the user sees "SAFETY" rather
/// than a bare "no text".
fn extract_text(response: GenerateContentResponse) -> Result<String, StudyBuddyError> {
    let text = response
        .candidates
        .first()
        .and_then(|c| c.content.parts.first())
        .and_then(|p| p.text.clone());

    match text {
        Some(t) if !t.trim().is_empty() => Ok(t),
        _ => {
            let reason = response
                .candidates
                .first()
                .and_then(|c| c.finish_reason.clone())
                .unwrap_or_else(|| "unknown".to_string());
            Err(StudyBuddyError::ModelRequest {
                message: format!("model returned no text (finish reason: {reason})"),
            })
        }
    }
}

// ── Wire types ───────────────────────────────────────────────────────────
//
// Field names follow the Gemini REST API's camelCase convention.

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    // Safety-blocked candidates arrive without a content field at all.
    #[serde(default)]
    content: Content,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    prompt_token_count: Option<i32>,
    candidates_token_count: Option<i32>,
}
