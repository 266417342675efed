//! Typed records for OpenAI-compatible chat-completion responses.
//!
//! Responses are parsed into explicit structs so that a missing or
//! wrong-typed field fails loudly with [`RagError::Generation`] instead of
//! silently defaulting.

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};

/// A chat-completion response body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatCompletion {
    /// Server-assigned response identifier.
    #[serde(default)]
    pub id: Option<String>,
    /// The model that produced the response.
    #[serde(default)]
    pub model: Option<String>,
    /// Candidate answers; the first one is used.
    pub choices: Vec<Choice>,
    /// Token accounting, when reported.
    #[serde(default)]
    pub usage: Option<Usage>,
}

/// One candidate answer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Choice {
    /// Position of the candidate.
    pub index: u32,
    /// The generated message.
    pub message: ChatMessage,
    /// Why generation stopped (`stop`, `length`, ...).
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// A single chat message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    /// `system`, `user`, or `assistant`.
    pub role: String,
    /// Message text; `null` for some tool-call responses.
    pub content: Option<String>,
}

impl ChatMessage {
    /// A user message with the given content.
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user".to_string(), content: Some(content.into()) }
    }
}

/// Token usage for one request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Usage {
    /// Tokens in the prompt.
    pub prompt_tokens: u32,
    /// Tokens in the completion.
    pub completion_tokens: u32,
    /// Sum of both.
    pub total_tokens: u32,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

impl ChatCompletion {
    /// Parse a response body.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Generation`] on malformed JSON, on missing or
    /// wrong-typed required fields, or when the body is an API error object.
    pub fn from_json(body: &str) -> Result<Self> {
        serde_json::from_str(body).map_err(|e| {
            let message = match api_error_message(body) {
                Some(detail) => format!("API error: {detail}"),
                None => format!("failed to parse response: {e}"),
            };
            RagError::generation("chat-completions", message)
        })
    }

    /// The first choice's text.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Generation`] if there are no choices or the first
    /// choice has no content.
    pub fn answer_text(&self) -> Result<&str> {
        let choice = self
            .choices
            .first()
            .ok_or_else(|| RagError::generation("chat-completions", "response has no choices"))?;
        choice.message.content.as_deref().ok_or_else(|| {
            RagError::generation("chat-completions", "first choice has no message content")
        })
    }
}

/// Extract `error.message` from an API error body, if it is one.
pub fn api_error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorResponse>(body).ok().map(|e| e.error.message)
}
