//! Language-model completion service.
//!
//! Everything that talks to a model goes through [`CompletionService`], a
//! single `complete(request) -> text` capability. The production client is
//! [`GroqClient`]; tests inject scripted fakes through the same trait.

pub mod groq;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use groq::GroqClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// One chat completion call
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
}

impl CompletionRequest {
    /// System + user prompt pair
    pub fn new(system: impl Into<String>, user: impl Into<String>, temperature: f32) -> Self {
        Self {
            messages: vec![ChatMessage::system(system), ChatMessage::user(user)],
            temperature,
            max_tokens: None,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Text of the first system message, if any
    pub fn system_prompt(&self) -> Option<&str> {
        self.messages
            .iter()
            .find(|m| m.role == Role::System)
            .map(|m| m.content.as_str())
    }

    /// Text of the last user message, if any
    pub fn user_prompt(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
    }
}

/// Errors that can occur while calling the completion service
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("Completion service API key is not configured")]
    MissingApiKey,

    #[error("Completion request timed out")]
    Timeout,

    #[error("Completion request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Completion service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Completion response could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Completion response contained no text")]
    EmptyResponse,
}

#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Run one completion and return the assistant text
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError>;
}
