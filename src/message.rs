//! Chat messages and completion requests sent to a provider.

use crate::error::{LlmccError, Result};
use serde::{Deserialize, Serialize};

/// Default output cap for a single completion call
pub const DEFAULT_REQUEST_MAX_TOKENS: u32 = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A role-tagged message in the request wire format shared by both providers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Input for one completion call: either a prepared message list or a
/// bare prompt that becomes a single user turn.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub messages: Option<Vec<Message>>,
    pub prompt: Option<String>,
    pub max_tokens: u32,
}

impl Default for CompletionRequest {
    fn default() -> Self {
        Self {
            messages: None,
            prompt: None,
            max_tokens: DEFAULT_REQUEST_MAX_TOKENS,
        }
    }
}

impl CompletionRequest {
    pub fn from_prompt(prompt: impl Into<String>) -> Self {
        Self {
            prompt: Some(prompt.into()),
            ..Self::default()
        }
    }

    pub fn from_messages(messages: Vec<Message>) -> Self {
        Self {
            messages: Some(messages),
            ..Self::default()
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Messages to send. An explicit message list takes precedence over
    /// the prompt.
    pub fn into_messages(self) -> Result<Vec<Message>> {
        match (self.messages, self.prompt) {
            (Some(messages), _) => Ok(messages),
            (None, Some(prompt)) => Ok(vec![Message::user(prompt)]),
            (None, None) => Err(LlmccError::MissingInput),
        }
    }
}
