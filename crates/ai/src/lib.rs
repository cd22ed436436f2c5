use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod extract;
pub mod prompts;
pub mod router;
pub mod sanitize;

pub use extract::{extract_json, extract_structured, JsonShape};
pub use router::{
    Completion, CompletionOptions, ModelBackend, ModelRouter, RouterStats, TaskKind,
};
pub use sanitize::sanitize_response;

#[derive(Debug, Error)]
pub enum AiError {
    /// Every backend in the priority list failed; message chains the last
    /// underlying error.
    #[error("all AI backends exhausted: {0}")]
    Upstream(String),
    #[error("could not extract structured JSON from AI response: {0}")]
    ExtractionFailed(String),
    #[error("AI request failed: {0}")]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, AiError>;

/// A message in a chat-completion conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}
