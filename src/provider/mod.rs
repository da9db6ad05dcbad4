//! LLM provider layer
//!
//! Resolves a model name to one of the supported providers and streams a
//! single completion from it.

mod anthropic;
mod config;
mod openai;
pub mod sse;

pub use anthropic::*;
pub use config::*;
pub use openai::*;

use crate::config::LlmConfig;
use crate::error::{LlmccError, Result};
use crate::message::CompletionRequest;

/// Resolve a model name to its provider and canonical model.
///
/// Synonyms are applied first. A `provider/model` name selects the provider
/// explicitly; a bare name is matched against each provider's allow-list.
pub fn resolve_model(name: &str) -> Result<(ProviderKind, String)> {
    let name = canonical_model_name(name);

    if let Some((provider, model)) = name.split_once('/') {
        let kind =
            ProviderKind::from_name(provider).ok_or_else(|| LlmccError::UnknownProvider {
                provider: provider.to_string(),
                model: name.to_string(),
            })?;
        return Ok((kind, model.to_string()));
    }

    let kind = infer_provider(name).ok_or_else(|| LlmccError::UnknownModel(name.to_string()))?;
    Ok((kind, name.to_string()))
}

/// Pick the API key: an explicit non-empty key wins, then the provider's
/// environment variable.
pub fn resolve_api_key(provider: &ProviderConfig, explicit: Option<&str>) -> Result<String> {
    if let Some(key) = explicit.filter(|key| !key.is_empty()) {
        return Ok(key.to_string());
    }

    match std::env::var(provider.api_key_env) {
        Ok(key) if !key.is_empty() => Ok(key),
        _ => Err(LlmccError::MissingApiKey {
            provider: provider.display_name,
            env_var: provider.api_key_env,
        }),
    }
}

/// A configured provider client
#[derive(Debug, Clone)]
pub enum LlmClient {
    Anthropic(AnthropicClient),
    OpenAI(OpenAiClient),
}

impl LlmClient {
    /// Build the client for a model name using the credentials and sampling
    /// settings from `config`
    pub fn by_name(name: &str, config: &LlmConfig) -> Result<Self> {
        let (kind, model) = resolve_model(name)?;
        let api_key = config.api_key.as_deref();

        let client = match kind {
            ProviderKind::Anthropic => {
                let mut client = AnthropicClient::new(model, api_key, config.temperature)?;
                if let Some(url) = &config.base_url {
                    client = client.with_base_url(url.clone());
                }
                LlmClient::Anthropic(client)
            }
            ProviderKind::OpenAI => {
                let mut client = OpenAiClient::new(model, api_key, config.temperature)?;
                if let Some(url) = &config.base_url {
                    client = client.with_base_url(url.clone());
                }
                LlmClient::OpenAI(client)
            }
        };

        tracing::debug!(provider = %kind, model = client.model(), requested = name, "Resolved LLM client");
        Ok(client)
    }

    pub fn kind(&self) -> ProviderKind {
        match self {
            LlmClient::Anthropic(_) => ProviderKind::Anthropic,
            LlmClient::OpenAI(_) => ProviderKind::OpenAI,
        }
    }

    pub fn model(&self) -> &str {
        match self {
            LlmClient::Anthropic(client) => client.model(),
            LlmClient::OpenAI(client) => client.model(),
        }
    }

    /// Run one streaming completion and return the assembled text
    pub async fn get_full_message(&self, request: CompletionRequest) -> Result<String> {
        match self {
            LlmClient::Anthropic(client) => client.get_full_message(request).await,
            LlmClient::OpenAI(client) => client.get_full_message(request).await,
        }
    }
}
