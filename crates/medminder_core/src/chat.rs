//! Wire types for the remote health-assistant endpoint.
//!
//! Reply generation happens remotely; core only shapes the request and
//! interprets the response body.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatRequest {
    pub message: String,
}

impl ChatRequest {
    /// Returns `None` for blank input, which is never sent.
    pub fn new(message: &str) -> Option<Self> {
        let message = message.trim();
        (!message.is_empty()).then(|| Self {
            message: message.to_string(),
        })
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Interpreted endpoint reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatReply {
    Answer(String),
    Failed(String),
}

#[derive(Deserialize)]
struct RawReply {
    response: Option<String>,
    error: Option<String>,
}

impl ChatReply {
    /// Parses `{"response": ...}` or `{"error": ...}`.
    pub fn from_json(body: &str) -> Self {
        match serde_json::from_str::<RawReply>(body) {
            Ok(RawReply {
                response: Some(text),
                ..
            }) => Self::Answer(text),
            Ok(RawReply {
                error: Some(error), ..
            }) => Self::Failed(error),
            Ok(_) => Self::Failed("empty response".to_string()),
            Err(err) => Self::Failed(format!("malformed response: {err}")),
        }
    }

    /// Text shown in the conversation.
    pub fn display_text(&self) -> String {
        match self {
            Self::Answer(text) => text.clone(),
            Self::Failed(error) => format!(
                "Sorry, I encountered an issue while processing your request. Please try again later. (Error: {error})"
            ),
        }
    }
}
