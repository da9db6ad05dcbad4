//! llmcc - Large language models as prompt compilers
//!
//! This crate provides:
//! - Handlebars prompt templates bound to `key=value` fields
//! - Model name resolution across the Anthropic and OpenAI providers
//! - Streaming completion clients that assemble the full response text

pub mod compiler;
pub mod config;
pub mod error;
pub mod message;
pub mod provider;
pub mod telemetry;
pub mod templates;

pub use compiler::Llmcc;
pub use config::{Config, LlmConfig, TelemetryConfig};
pub use error::{LlmccError, Result};
pub use message::{CompletionRequest, Message, Role};
pub use provider::{resolve_model, AnthropicClient, LlmClient, OpenAiClient, ProviderKind};
pub use templates::{parse_fields, Templates};
