pub mod envelope;
pub mod ollama;
pub mod prompt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use envelope::{AnswerSource, InsightText};
pub use prompt::InsightRequest;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434/api/generate";
pub const DEFAULT_MODEL: &str = "llama3.2";
pub const DEFAULT_TIMEOUT_SECS: u64 = 180;

/// Where and how to reach the inference endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InsightSettings {
    pub endpoint: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for InsightSettings {
    fn default() -> Self {
        InsightSettings {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Outcome of one ask-for-insights action.
#[derive(Debug, Clone, PartialEq)]
pub enum InsightResult {
    Text(InsightText),
    /// Endpoint unreachable, connection dropped, or timed out
    Transport { detail: String, timed_out: bool },
    /// Endpoint answered with a non-success status
    Server { status: u16, body: String },
    /// Success status but the body was not JSON
    Parse { detail: String, body_snapshot: String },
}

impl InsightResult {
    pub fn is_success(&self) -> bool {
        matches!(self, InsightResult::Text(_))
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            InsightResult::Text(t) => Some(&t.content),
            _ => None,
        }
    }

    /// Short kind label for logs and status lines
    pub fn kind(&self) -> &'static str {
        match self {
            InsightResult::Text(_) => "success",
            InsightResult::Transport { .. } => "transport_error",
            InsightResult::Server { .. } => "server_error",
            InsightResult::Parse { .. } => "parse_error",
        }
    }
}

/// User-visible message for the result
impl fmt::Display for InsightResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InsightResult::Text(t) => f.write_str(&t.content),
            InsightResult::Transport { detail, timed_out: true } => {
                write!(f, "⚠️ Timed out waiting for the inference endpoint ({})", detail)
            }
            InsightResult::Transport { detail, timed_out: false } => {
                write!(f, "⚠️ Error calling the inference endpoint (connection failed): {}", detail)
            }
            InsightResult::Server { status, body } => {
                write!(f, "❌ Inference endpoint returned status {}: {}", status, body)
            }
            InsightResult::Parse { detail, body_snapshot } => {
                write!(f, "Error parsing inference response: {}\n{}", detail, body_snapshot)
            }
        }
    }
}

/// A text-generation backend. Implementations must not retry.
#[async_trait]
pub trait InsightProvider: Send + Sync {
    fn name(&self) -> &str;
    async fn ask(&self, request: &InsightRequest) -> InsightResult;
}

/// One-shot ask against `settings`
pub async fn ask(request: &InsightRequest, settings: &InsightSettings) -> InsightResult {
    match ollama::OllamaClient::new(settings.clone()) {
        Ok(client) => client.ask(request).await,
        Err(e) => InsightResult::Transport {
            detail: format!("failed to build HTTP client: {}", e),
            timed_out: false,
        },
    }
}
