//! Anthropic messages client.
//!
//! Streams `/v1/messages` and rebuilds the complete message from the event
//! sequence before any text is returned.

use super::config::ANTHROPIC;
use super::sse::{self, Flow};
use crate::error::{LlmccError, Result};
use crate::message::{CompletionRequest, Message};
use serde::{Deserialize, Serialize};
use std::time::Instant;

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Streaming client for Anthropic's messages API
#[derive(Clone)]
pub struct AnthropicClient {
    model: String,
    api_key: String,
    temperature: f32,
    base_url: String,
    http_client: reqwest::Client,
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: &'a [Message],
    temperature: f32,
    stream: bool,
}

/// The message assembled from a completed stream
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FinalMessage {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub content: Vec<ContentBlock>,
    #[serde(default)]
    pub stop_reason: Option<String>,
    #[serde(default)]
    pub usage: Usage,
}

impl FinalMessage {
    /// Concatenated text of every text block, in order
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text.as_str()),
                ContentBlock::Other => None,
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub input_tokens: u64,
    #[serde(default)]
    pub output_tokens: u64,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum StreamEvent {
    MessageStart {
        message: FinalMessage,
    },
    ContentBlockStart {
        content_block: ContentBlock,
    },
    ContentBlockDelta {
        index: usize,
        delta: BlockDelta,
    },
    ContentBlockStop,
    MessageDelta {
        delta: MessageDeltaBody,
        #[serde(default)]
        usage: Option<DeltaUsage>,
    },
    MessageStop,
    Ping,
    Error {
        error: ErrorBody,
    },
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum BlockDelta {
    TextDelta {
        text: String,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct MessageDeltaBody {
    stop_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DeltaUsage {
    output_tokens: u64,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(rename = "type")]
    kind: String,
    message: String,
}

/// Builds a [`FinalMessage`] from streamed events
#[derive(Debug, Default)]
pub struct MessageAccumulator {
    message: FinalMessage,
}

impl MessageAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one `data:` payload from the stream
    pub fn push_data(&mut self, data: &str) -> Result<Flow> {
        let event: StreamEvent = serde_json::from_str(data)?;
        self.apply(event)
    }

    fn apply(&mut self, event: StreamEvent) -> Result<Flow> {
        match event {
            StreamEvent::MessageStart { message } => self.message = message,
            StreamEvent::ContentBlockStart { content_block } => {
                self.message.content.push(content_block);
            }
            StreamEvent::ContentBlockDelta { index, delta } => {
                let block = self.message.content.get_mut(index).ok_or_else(|| {
                    LlmccError::Stream(format!("delta for unknown content block {}", index))
                })?;
                if let (ContentBlock::Text { text }, BlockDelta::TextDelta { text: delta }) =
                    (block, delta)
                {
                    text.push_str(&delta);
                }
            }
            StreamEvent::MessageDelta { delta, usage } => {
                self.message.stop_reason = delta.stop_reason;
                if let Some(usage) = usage {
                    self.message.usage.output_tokens = usage.output_tokens;
                }
            }
            StreamEvent::MessageStop => return Ok(Flow::Done),
            StreamEvent::Error { error } => {
                return Err(LlmccError::Stream(format!("{}: {}", error.kind, error.message)));
            }
            StreamEvent::ContentBlockStop | StreamEvent::Ping | StreamEvent::Unknown => {}
        }
        Ok(Flow::Continue)
    }

    pub fn into_message(self) -> FinalMessage {
        self.message
    }
}

impl std::fmt::Debug for AnthropicClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicClient")
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl AnthropicClient {
    /// Create a client for an allow-listed model
    pub fn new(model: impl Into<String>, api_key: Option<&str>, temperature: f32) -> Result<Self> {
        let model = model.into();
        if !ANTHROPIC.supports(&model) {
            return Err(LlmccError::UnsupportedModel {
                provider: ANTHROPIC.display_name,
                model,
            });
        }
        let api_key = super::resolve_api_key(&ANTHROPIC, api_key)?;

        Ok(Self {
            model,
            api_key,
            temperature,
            base_url: ANTHROPIC.base_url.to_string(),
            http_client: reqwest::Client::builder().build()?,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    async fn open_stream(&self, request: CompletionRequest) -> Result<reqwest::Response> {
        let max_tokens = request.max_tokens;
        let messages = request.into_messages()?;

        let body = MessagesRequest {
            model: &self.model,
            max_tokens,
            messages: &messages,
            temperature: self.temperature,
            stream: true,
        };

        let response = self
            .http_client
            .post(format!("{}/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;
        Ok(response)
    }

    /// Stream a response and return the fully assembled message
    pub async fn get_final_message(&self, request: CompletionRequest) -> Result<FinalMessage> {
        let start = Instant::now();
        let response = self.open_stream(request).await?;

        let mut accumulator = MessageAccumulator::new();
        sse::drain(response, |data| accumulator.push_data(data)).await?;
        let message = accumulator.into_message();

        tracing::debug!(
            target: "llm",
            message_id = %message.id,
            stop_reason = ?message.stop_reason,
            input_tokens = message.usage.input_tokens,
            output_tokens = message.usage.output_tokens,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Anthropic stream finished"
        );
        Ok(message)
    }

    /// Stream a response and return the text of the final message
    pub async fn get_full_message(&self, request: CompletionRequest) -> Result<String> {
        Ok(self.get_final_message(request).await?.text())
    }
}
