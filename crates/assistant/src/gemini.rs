use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;

use formsite_core::config::AssistantConfig;
use formsite_core::errors::PipelineError;

use crate::llm::CompletionClient;
use crate::runtime::SYSTEM_INSTRUCTION;

/// Sampling temperature for every completion request.
const TEMPERATURE: f32 = 0.7;

/// HTTP client for the hosted `generateContent` endpoint.
///
/// Single attempt, no retry: a failed generation fails the chat request.
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: SecretString,
    model: String,
}

impl GeminiClient {
    pub fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        api_key: SecretString,
        model: impl Into<String>,
    ) -> Self {
        Self { http, base_url: base_url.into(), api_key, model: model.into() }
    }

    /// Builds a client from the loaded configuration, failing with the
    /// missing-variable error when the deployment carries no API key.
    pub fn from_config(
        http: reqwest::Client,
        config: &AssistantConfig,
    ) -> Result<Self, PipelineError> {
        let api_key = config.require_api_key()?.clone();
        Ok(Self::new(http, config.base_url.clone(), api_key, config.model.clone()))
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

#[async_trait]
impl CompletionClient for GeminiClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let request = GenerateContentRequest {
            contents: vec![Content { role: Some("user"), parts: vec![Part { text: prompt }] }],
            system_instruction: Content { role: None, parts: vec![Part { text: SYSTEM_INSTRUCTION }] },
            generation_config: GenerationConfig { temperature: TEMPERATURE },
        };

        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", self.api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .context("completion request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("generation endpoint returned {status}: {body}"));
        }

        let payload: GenerateContentResponse =
            response.json().await.context("failed to decode completion response")?;

        let text = payload
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| {
                content.parts.into_iter().map(|part| part.text).collect::<Vec<_>>().join("")
            })
            .unwrap_or_default();

        debug!(model = %self.model, chars = text.len(), "completion received");
        Ok(text)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    system_instruction: Content<'a>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
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
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}
