//! Prompt compilation: templates in, model output out.

use crate::config::Config;
use crate::error::{LlmccError, Result};
use crate::message::CompletionRequest;
use crate::provider::LlmClient;
use crate::templates::{parse_fields, Templates};
use std::time::Instant;

/// Renders the configured templates and runs them through the model
pub struct Llmcc {
    config: Config,
    templates: Templates,
}

impl Llmcc {
    pub fn new(config: Config) -> Self {
        let templates = Templates::new(config.strict);
        Self { config, templates }
    }

    /// Render every template with the configured fields into one prompt
    pub fn render_template(&self) -> Result<String> {
        let fields = parse_fields(&self.config.fields);
        self.templates.render_files(&self.config.templates, &fields)
    }

    /// Send `prompt` to the configured model and return the streamed text
    pub async fn generate_text(&self, prompt: &str) -> Result<String> {
        let llm = &self.config.llm;
        let client = LlmClient::by_name(&llm.model, llm)?;

        let start = Instant::now();
        tracing::info!(
            target: "llm",
            provider = %client.kind(),
            model = client.model(),
            max_tokens = llm.max_tokens,
            prompt_chars = prompt.len(),
            "Starting streaming LLM call"
        );

        let request = CompletionRequest::from_prompt(prompt).with_max_tokens(llm.max_tokens);
        let text = client.get_full_message(request).await.inspect_err(|e| {
            tracing::error!(target: "llm", error = %e, "Streaming LLM call failed");
        })?;

        tracing::info!(
            target: "llm",
            provider = %client.kind(),
            model = client.model(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            output_chars = text.len(),
            "Streaming LLM call completed"
        );
        Ok(text)
    }

    /// Render the prompt and complete it on a dedicated single-threaded
    /// runtime that lives only for this call
    pub fn run(&self) -> Result<String> {
        let prompt = self.render_template()?;

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(LlmccError::Runtime)?;
        runtime.block_on(self.generate_text(&prompt))
    }

    /// Overwrite the output file with `text`
    pub fn write_output(&self, text: &str) -> Result<()> {
        let path = &self.config.output;
        std::fs::write(path, text).map_err(|source| LlmccError::OutputWrite {
            path: path.clone(),
            source,
        })?;
        tracing::info!(output = %path.display(), bytes = text.len(), "Wrote output");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_render_template_binds_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hello.jinja");
        std::fs::write(&path, "Hello {{ name }}").unwrap();

        let config = Config::new("gpt4", vec![path])
            .with_fields(vec!["name=World".to_string(), "ignored".to_string()]);
        let llmcc = Llmcc::new(config);

        assert_eq!(llmcc.render_template().unwrap(), "Hello World");
    }

    #[test]
    fn test_unknown_model_fails_before_network() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.txt");
        std::fs::write(&path, "prompt").unwrap();

        // Unroutable base URL: reaching the network would fail differently
        let config = Config::new("unknown-model", vec![path])
            .with_api_key("key".to_string())
            .with_base_url("http://127.0.0.1:9".to_string());

        let err = Llmcc::new(config).run().unwrap_err();
        assert!(matches!(err, LlmccError::UnknownModel(_)));
    }

    #[test]
    fn test_missing_template_fails_first() {
        let config = Config::new("unknown-model", vec![PathBuf::from("/no/such/template")]);
        let err = Llmcc::new(config).run().unwrap_err();
        assert!(matches!(err, LlmccError::TemplateRead { .. }));
    }

    #[test]
    fn test_write_output_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.txt");
        std::fs::write(&output, "previous contents that are longer").unwrap();

        let llmcc = Llmcc::new(Config::default().with_output(output.clone()));
        llmcc.write_output("new").unwrap();

        assert_eq!(std::fs::read_to_string(output).unwrap(), "new");
    }

    #[test]
    fn test_write_output_unwritable() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("missing-dir").join("out.txt");

        let err = Llmcc::new(Config::default().with_output(output))
            .write_output("text")
            .unwrap_err();
        assert!(matches!(err, LlmccError::OutputWrite { .. }));
    }
}
