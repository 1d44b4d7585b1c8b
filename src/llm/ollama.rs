use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::envelope;
use super::prompt::InsightRequest;
use super::{InsightProvider, InsightResult, InsightSettings};

/// Longest raw body kept in a parse failure
const BODY_SNAPSHOT_CHARS: usize = 500;

#[derive(Debug, Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

/// Client for a local Ollama-compatible generate endpoint.
pub struct OllamaClient {
    client: Client,
    settings: InsightSettings,
}

impl OllamaClient {
    pub fn new(settings: InsightSettings) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self { client, settings })
    }

    /// Single POST, no retries. Every outcome is folded into `InsightResult`.
    pub async fn generate(&self, prompt: &str) -> InsightResult {
        let request = OllamaRequest {
            model: &self.settings.model,
            prompt,
            stream: false,
        };

        tracing::info!(url = %self.settings.endpoint, model = %self.settings.model, "Requesting insights");

        let response = match self
            .client
            .post(&self.settings.endpoint)
            .json(&request)
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => return self.transport_failure(&e),
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "Inference endpoint returned an error status");
            return InsightResult::Server { status: status.as_u16(), body };
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => return self.transport_failure(&e),
        };

        match serde_json::from_str::<serde_json::Value>(&body) {
            Ok(reply) => {
                let text = envelope::normalize(&reply);
                if text.is_fallback() {
                    tracing::warn!("Reply had no recognized answer field; using the whole reply");
                } else {
                    tracing::debug!(source = ?text.source, chars = text.content.len(), "Insight received");
                }
                InsightResult::Text(text)
            }
            Err(e) => InsightResult::Parse {
                detail: e.to_string(),
                body_snapshot: body.chars().take(BODY_SNAPSHOT_CHARS).collect(),
            },
        }
    }

    fn transport_failure(&self, e: &reqwest::Error) -> InsightResult {
        let timed_out = e.is_timeout();
        let detail = if timed_out {
            format!("no reply within {}s: {}", self.settings.timeout_secs, error_chain(e))
        } else {
            format!("{}. Is Ollama running at {}?", error_chain(e), self.settings.endpoint)
        };
        tracing::warn!(timed_out, %detail, "Inference request failed");
        InsightResult::Transport { detail, timed_out }
    }

    fn tags_url(&self) -> Result<Url, String> {
        Url::parse(&self.settings.endpoint)
            .and_then(|u| u.join("/api/tags"))
            .map_err(|e| format!("Invalid endpoint URL '{}': {}", self.settings.endpoint, e))
    }

    /// Get list of models the server has pulled
    pub async fn list_models(&self) -> Result<Vec<String>, String> {
        #[derive(Deserialize)]
        struct TagsResponse {
            models: Vec<ModelInfo>,
        }

        #[derive(Deserialize)]
        struct ModelInfo {
            name: String,
        }

        let url = self.tags_url()?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| format!("Ollama not reachable: {}", error_chain(&e)))?;

        if !response.status().is_success() {
            return Err(format!("Ollama is not responding (status {})", response.status().as_u16()));
        }

        let tags: TagsResponse = response
            .json()
            .await
            .map_err(|e| format!("Failed to parse Ollama response: {}", e))?;

        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    /// Check the server is up and the configured model is pulled
    pub async fn test_connection(&self) -> Result<(), String> {
        let models = self.list_models().await?;
        let model = &self.settings.model;

        if !models.iter().any(|m| m.starts_with(model.as_str())) {
            return Err(format!("Model '{}' not found. Run: ollama pull {}", model, model));
        }

        Ok(())
    }
}

#[async_trait]
impl InsightProvider for OllamaClient {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn ask(&self, request: &InsightRequest) -> InsightResult {
        self.generate(request.as_str()).await
    }
}

/// `e` followed by its sources, colon separated
fn error_chain(e: &dyn std::error::Error) -> String {
    let mut out = e.to_string();
    let mut source = e.source();
    while let Some(inner) = source {
        out.push_str(": ");
        out.push_str(&inner.to_string());
        source = inner.source();
    }
    out
}
