//! Error types for template rendering, provider resolution and streaming

use std::path::PathBuf;

/// Errors produced while compiling a prompt into model output
#[derive(Debug, thiserror::Error)]
pub enum LlmccError {
    #[error("Unknown model: {0}")]
    UnknownModel(String),

    #[error("Unknown provider '{provider}' in model name '{model}'")]
    UnknownProvider { provider: String, model: String },

    #[error("Model '{model}' is not supported by {provider}")]
    UnsupportedModel { provider: &'static str, model: String },

    #[error("Missing {provider} API key: set {env_var} or pass --api-key")]
    MissingApiKey {
        provider: &'static str,
        env_var: &'static str,
    },

    #[error("Either messages or prompt must be provided")]
    MissingInput,

    #[error("Failed to read template {}: {source}", path.display())]
    TemplateRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to render template {}: {source}", path.display())]
    TemplateRender {
        path: PathBuf,
        #[source]
        source: Box<handlebars::RenderError>,
    },

    #[error("Failed to write output {}: {source}", path.display())]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to start async runtime: {0}")]
    Runtime(#[source] std::io::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {status}: {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Stream error: {0}")]
    Stream(String),

    #[error("Failed to parse stream event: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, LlmccError>;
