//! llmcc CLI
//!
//! Renders templates into a prompt, runs it through a hosted model and
//! writes the result to a file.

use anyhow::Result;
use clap::Parser;
use llmcc::config::{DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_OUTPUT, DEFAULT_TEMPERATURE};
use llmcc::{telemetry, Config, Llmcc};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "llmcc")]
#[command(about = "Compile prompt templates into text with a large language model", long_about = None)]
struct Cli {
    /// Model name, optionally qualified as provider/model
    #[arg(short, long, default_value = DEFAULT_MODEL)]
    model: String,

    /// Output text file (overwritten)
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Template field as key=value (repeatable)
    #[arg(short, long = "field")]
    field: Vec<String>,

    /// Template files, rendered and concatenated in order
    #[arg(required = true)]
    templates: Vec<PathBuf>,

    /// API key - overrides ANTHROPIC_API_KEY / OPENAI_API_KEY
    #[arg(long)]
    api_key: Option<String>,

    /// Sampling temperature
    #[arg(long, default_value_t = DEFAULT_TEMPERATURE)]
    temperature: f32,

    /// Maximum tokens in the response
    #[arg(long, default_value_t = DEFAULT_MAX_TOKENS)]
    max_tokens: u32,

    /// Base URL for the provider API (e.g., a proxy)
    #[arg(long)]
    base_url: Option<String>,

    /// Fail on template fields that were not supplied
    #[arg(long)]
    strict: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Directory for JSON log files
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

/// Build configuration from CLI args
fn build_config(cli: Cli) -> Config {
    let mut config = Config::new(cli.model, cli.templates)
        .with_fields(cli.field)
        .with_output(cli.output)
        .with_temperature(cli.temperature)
        .with_max_tokens(cli.max_tokens)
        .with_strict(cli.strict)
        .with_verbose(cli.verbose)
        .with_log_dir(cli.log_dir);

    if let Some(api_key) = cli.api_key {
        config = config.with_api_key(api_key);
    }
    if let Some(base_url) = cli.base_url {
        config = config.with_base_url(base_url);
    }
    config
}

fn main() -> Result<()> {
    // Try loading .env file
    let _ = dotenvy::dotenv();

    let config = build_config(Cli::parse());
    let _log_guard = telemetry::init(&config.telemetry)?;

    let llmcc = Llmcc::new(config);
    let text = llmcc.run()?;
    llmcc.write_output(&text)?;

    Ok(())
}
