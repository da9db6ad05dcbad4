//! Provider configuration
//!
//! Static tables for model synonyms and per-provider allow-lists. Adding a
//! provider means adding a `ProviderConfig` entry and a client variant.

/// Short aliases mapped to canonical model names
pub const SYNONYMS: &[(&str, &str)] = &[("gpt4", "gpt-4"), ("gpt4o", "gpt-4o")];

/// Supported providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    Anthropic,
    OpenAI,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::OpenAI => "openai",
        }
    }

    /// Parse an explicit provider selector (the part before `/`)
    pub fn from_name(name: &str) -> Option<Self> {
        PROVIDERS
            .iter()
            .find(|config| config.name == name)
            .map(|config| config.kind)
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration for a model provider
#[derive(Debug)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    /// Selector used in `provider/model` names
    pub name: &'static str,
    /// Display name for the provider
    pub display_name: &'static str,
    /// API base URL
    pub base_url: &'static str,
    /// Environment variable name for the API key
    pub api_key_env: &'static str,
    /// Models this provider accepts
    pub models: &'static [&'static str],
}

impl ProviderConfig {
    pub fn supports(&self, model: &str) -> bool {
        self.models.contains(&model)
    }
}

pub static ANTHROPIC: ProviderConfig = ProviderConfig {
    kind: ProviderKind::Anthropic,
    name: "anthropic",
    display_name: "Anthropic",
    base_url: "https://api.anthropic.com/v1",
    api_key_env: "ANTHROPIC_API_KEY",
    models: &[
        "claude-3-haiku-20240307",
        "claude-3-sonnet-20240229",
        "claude-3-opus-20240229",
    ],
};

pub static OPENAI: ProviderConfig = ProviderConfig {
    kind: ProviderKind::OpenAI,
    name: "openai",
    display_name: "OpenAI",
    base_url: "https://api.openai.com/v1",
    api_key_env: "OPENAI_API_KEY",
    models: &["gpt-4", "gpt-4o"],
};

/// Providers in inference order: a bare model name goes to the first
/// provider whose allow-list contains it.
pub static PROVIDERS: &[&ProviderConfig] = &[&ANTHROPIC, &OPENAI];

/// Replace a known alias with its canonical model name
pub fn canonical_model_name(name: &str) -> &str {
    SYNONYMS
        .iter()
        .find(|(alias, _)| *alias == name)
        .map(|(_, canonical)| *canonical)
        .unwrap_or(name)
}

/// Pick the provider for a bare model name by allow-list membership
pub fn infer_provider(model: &str) -> Option<ProviderKind> {
    PROVIDERS
        .iter()
        .find(|config| config.supports(model))
        .map(|config| config.kind)
}
