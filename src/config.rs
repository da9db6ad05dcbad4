//! Configuration for a single llmcc invocation

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_MODEL: &str = "gpt-4";
pub const DEFAULT_OUTPUT: &str = "output.txt";
pub const DEFAULT_MAX_TOKENS: u32 = 4096;
/// Sampling temperature shared by every provider
pub const DEFAULT_TEMPERATURE: f32 = 1.0;

/// Main configuration for a compile run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// LLM provider configuration
    pub llm: LlmConfig,

    /// Template files, rendered and concatenated in order
    pub templates: Vec<PathBuf>,

    /// Raw `key=value` fields bound into the templates
    pub fields: Vec<String>,

    /// File the model output is written to (overwritten)
    pub output: PathBuf,

    /// Treat undefined template fields as errors
    pub strict: bool,

    /// Logging settings
    pub telemetry: TelemetryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Model name, optionally qualified as `provider/model`
    pub model: String,

    /// API key (falls back to the provider's environment variable)
    pub api_key: Option<String>,

    /// Base URL override for the provider endpoint
    pub base_url: Option<String>,

    /// Maximum tokens for the response
    pub max_tokens: u32,

    /// Temperature for sampling
    pub temperature: f32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Enable verbose logging
    pub verbose: bool,

    /// Directory for JSON log files
    pub log_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm: LlmConfig::default(),
            templates: Vec::new(),
            fields: Vec::new(),
            output: PathBuf::from(DEFAULT_OUTPUT),
            strict: false,
            telemetry: TelemetryConfig::default(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            base_url: None,
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

impl LlmConfig {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Self::default()
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }
}

impl Config {
    /// Create a config for the given model and template paths
    pub fn new(model: impl Into<String>, templates: Vec<PathBuf>) -> Self {
        Self {
            llm: LlmConfig::new(model),
            templates,
            ..Self::default()
        }
    }

    pub fn with_fields(mut self, fields: Vec<String>) -> Self {
        self.fields = fields;
        self
    }

    pub fn with_output(mut self, output: PathBuf) -> Self {
        self.output = output;
        self
    }

    /// Set API key
    pub fn with_api_key(mut self, api_key: String) -> Self {
        self.llm.api_key = Some(api_key);
        self
    }

    /// Point the provider client at a different endpoint
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.llm.base_url = Some(base_url);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.llm.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.llm.temperature = temperature;
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Set verbose logging
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.telemetry.verbose = verbose;
        self
    }

    /// Set log directory
    pub fn with_log_dir(mut self, log_dir: Option<PathBuf>) -> Self {
        self.telemetry.log_dir = log_dir;
        self
    }
}
