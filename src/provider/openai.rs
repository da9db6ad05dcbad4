//! OpenAI chat completions client.
//!
//! Streams `/v1/chat/completions` and appends every non-empty text delta to
//! a running buffer.

use super::config::OPENAI;
use super::sse::{self, Flow};
use crate::error::{LlmccError, Result};
use crate::message::{CompletionRequest, Message};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Streaming client for OpenAI's chat completions API
#[derive(Clone)]
pub struct OpenAiClient {
    model: String,
    api_key: String,
    temperature: f32,
    base_url: String,
    http_client: reqwest::Client,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    temperature: f32,
    max_tokens: u32,
    top_p: f32,
    stream: bool,
}

// Internal types for parsing streaming responses
#[derive(Debug, Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
    error: Option<StreamError>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    delta: StreamChunkDelta,
}

#[derive(Debug, Deserialize)]
struct StreamChunkDelta {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StreamError {
    message: String,
}

/// Concatenates text deltas from a chat completion stream
#[derive(Debug, Default)]
pub struct DeltaAccumulator {
    text: String,
}

impl DeltaAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one delta; `None` and empty fragments are skipped
    pub fn push_delta(&mut self, content: Option<&str>) {
        if let Some(content) = content {
            if !content.is_empty() {
                self.text.push_str(content);
            }
        }
    }

    /// Apply one `data:` payload from the stream
    pub fn push_data(&mut self, data: &str) -> Result<Flow> {
        if data == "[DONE]" {
            return Ok(Flow::Done);
        }

        let chunk: StreamChunk = serde_json::from_str(data)?;
        if let Some(error) = chunk.error {
            return Err(LlmccError::Stream(error.message));
        }
        if let Some(choice) = chunk.choices.first() {
            self.push_delta(choice.delta.content.as_deref());
        }
        Ok(Flow::Continue)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }
}

impl std::fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl OpenAiClient {
    /// Create a client for an allow-listed model
    pub fn new(model: impl Into<String>, api_key: Option<&str>, temperature: f32) -> Result<Self> {
        let model = model.into();
        if !OPENAI.supports(&model) {
            return Err(LlmccError::UnsupportedModel {
                provider: OPENAI.display_name,
                model,
            });
        }
        let api_key = super::resolve_api_key(&OPENAI, api_key)?;

        Ok(Self {
            model,
            api_key,
            temperature,
            base_url: OPENAI.base_url.to_string(),
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

        let body = ChatCompletionRequest {
            model: &self.model,
            messages: &messages,
            temperature: self.temperature,
            max_tokens,
            top_p: 1.0,
            stream: true,
        };

        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;
        Ok(response)
    }

    /// Stream a response, accumulating text deltas until the stream ends
    pub async fn get_full_message(&self, request: CompletionRequest) -> Result<String> {
        let start = Instant::now();
        let response = self.open_stream(request).await?;

        let mut accumulator = DeltaAccumulator::new();
        sse::drain(response, |data| accumulator.push_data(data)).await?;

        tracing::debug!(
            target: "llm",
            output_chars = accumulator.text().len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "OpenAI stream finished"
        );
        Ok(accumulator.into_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(content: Option<&str>) -> String {
        serde_json::json!({
            "id": "chatcmpl-1",
            "object": "chat.completion.chunk",
            "choices": [{"index": 0, "delta": {"content": content}, "finish_reason": null}]
        })
        .to_string()
    }

    #[test]
    fn test_skips_null_delta() {
        let mut accumulator = DeltaAccumulator::new();
        accumulator.push_delta(Some("Hel"));
        accumulator.push_delta(None);
        accumulator.push_delta(Some("lo"));
        assert_eq!(accumulator.into_text(), "Hello");
    }

    #[test]
    fn test_accumulates_stream_chunks() {
        let mut accumulator = DeltaAccumulator::new();
        let role_only = r#"{"choices":[{"index":0,"delta":{"role":"assistant"}}]}"#;

        assert_eq!(accumulator.push_data(role_only).unwrap(), Flow::Continue);
        for data in [chunk(Some("Hel")), chunk(None), chunk(Some("")), chunk(Some("lo"))] {
            assert_eq!(accumulator.push_data(&data).unwrap(), Flow::Continue);
        }
        assert_eq!(accumulator.push_data("[DONE]").unwrap(), Flow::Done);
        assert_eq!(accumulator.text(), "Hello");
    }

    #[test]
    fn test_empty_choices_chunk() {
        let mut accumulator = DeltaAccumulator::new();
        let usage_only = r#"{"choices":[],"usage":{"prompt_tokens":3,"completion_tokens":2}}"#;
        assert_eq!(accumulator.push_data(usage_only).unwrap(), Flow::Continue);
        assert_eq!(accumulator.text(), "");
    }

    #[test]
    fn test_error_chunk() {
        let mut accumulator = DeltaAccumulator::new();
        let err = accumulator
            .push_data(r#"{"error":{"message":"context length exceeded","type":"invalid_request_error"}}"#)
            .unwrap_err();
        assert!(matches!(err, LlmccError::Stream(ref m) if m == "context length exceeded"));
    }

    #[test]
    fn test_malformed_chunk() {
        let mut accumulator = DeltaAccumulator::new();
        let err = accumulator.push_data("{not json").unwrap_err();
        assert!(matches!(err, LlmccError::Json(_)));
    }

    #[test]
    fn test_rejects_model_outside_allow_list() {
        let err = OpenAiClient::new("claude-3-opus-20240229", Some("key"), 1.0).unwrap_err();
        assert!(matches!(
            err,
            LlmccError::UnsupportedModel { provider: "OpenAI", .. }
        ));
    }

    #[test]
    fn test_request_body_shape() {
        let messages = vec![Message::user("Hello World")];
        let body = ChatCompletionRequest {
            model: "gpt-4",
            messages: &messages,
            temperature: 1.0,
            max_tokens: 4096,
            top_p: 1.0,
            stream: true,
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({
                "model": "gpt-4",
                "messages": [{"role": "user", "content": "Hello World"}],
                "temperature": 1.0,
                "max_tokens": 4096,
                "top_p": 1.0,
                "stream": true
            })
        );
    }
}
