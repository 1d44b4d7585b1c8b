//! Reply envelope normalization.
//!
//! Local inference servers name the answer field differently across versions
//! (`response` for Ollama generate, `message` for chat, `choices` for
//! OpenAI-compatible routes). Fields are probed in a fixed order and the
//! first non-empty candidate wins.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Where the answer text was found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerSource {
    Output,
    Response,
    Message,
    Text,
    ChatChoice,
    /// No known field; the whole reply was stringified
    WholeReply,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightText {
    pub content: String,
    pub source: AnswerSource,
}

impl InsightText {
    pub fn is_fallback(&self) -> bool {
        self.source == AnswerSource::WholeReply
    }
}

type Extractor = fn(&Value) -> Option<String>;

const FIELD_CHAIN: &[(AnswerSource, Extractor)] = &[
    (AnswerSource::Output, output_field),
    (AnswerSource::Response, response_field),
    (AnswerSource::Message, message_field),
    (AnswerSource::Text, text_field),
    (AnswerSource::ChatChoice, chat_choice),
];

/// Pick the answer out of a parsed reply. Never fails.
pub fn normalize(reply: &Value) -> InsightText {
    for (source, extract) in FIELD_CHAIN {
        if let Some(content) = extract(reply) {
            return InsightText { content, source: *source };
        }
    }

    InsightText {
        content: reply.to_string(),
        source: AnswerSource::WholeReply,
    }
}

fn output_field(reply: &Value) -> Option<String> {
    reply.get("output").and_then(candidate)
}

fn response_field(reply: &Value) -> Option<String> {
    reply.get("response").and_then(candidate)
}

fn message_field(reply: &Value) -> Option<String> {
    let message = reply.get("message")?;
    // Chat-style servers nest the answer as {"role": .., "content": ..}
    if let Some(content) = message.get("content").and_then(candidate) {
        return Some(content);
    }
    candidate(message)
}

fn text_field(reply: &Value) -> Option<String> {
    reply.get("text").and_then(candidate)
}

fn chat_choice(reply: &Value) -> Option<String> {
    reply
        .get("choices")?
        .get(0)?
        .get("message")?
        .get("content")
        .and_then(candidate)
}

/// Non-empty value as text; empty strings, null, false, zero and empty
/// containers do not count. Whitespace-only text does.
fn candidate(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(false) => None,
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::Array(a) if a.is_empty() => None,
        Value::Object(o) if o.is_empty() => None,
        other => Some(other.to_string()),
    }
}
