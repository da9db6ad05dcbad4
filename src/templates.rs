//! Handlebars templates for prompts
//!
//! Templates are plain files on disk. Each file is read on every render,
//! rendered against the `key=value` fields given on the command line, and
//! the outputs are concatenated in argument order.

use crate::error::{LlmccError, Result};
use handlebars::Handlebars;
use std::collections::BTreeMap;
use std::path::Path;

/// File extensions whose output is HTML-escaped
const ESCAPED_EXTENSIONS: &[&str] = &["html", "htm", "xml", "jinja"];

/// Binding context built from command-line fields
pub type Fields = BTreeMap<String, String>;

/// Parse `key=value` strings into a rendering context.
///
/// Entries without `=` are dropped. Only the first `=` separates key from
/// value, and a later duplicate key wins.
pub fn parse_fields<S: AsRef<str>>(fields: &[S]) -> Fields {
    fields
        .iter()
        .filter_map(|field| field.as_ref().split_once('='))
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

/// Escape `& < > " '` and leave every other character untouched.
fn markup_escape(data: &str) -> String {
    let mut escaped = String::with_capacity(data.len());
    for c in data.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&#34;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Holds the handlebars registries used for rendering
pub struct Templates {
    escaped: Handlebars<'static>,
    plain: Handlebars<'static>,
}

impl Templates {
    /// Build the registries. In strict mode an undefined field is an error
    /// instead of rendering as empty.
    pub fn new(strict: bool) -> Self {
        let mut escaped = Handlebars::new();
        escaped.set_strict_mode(strict);
        escaped.register_escape_fn(markup_escape);

        let mut plain = Handlebars::new();
        plain.set_strict_mode(strict);
        plain.register_escape_fn(handlebars::no_escape);

        Self { escaped, plain }
    }

    fn registry_for(&self, path: &Path) -> &Handlebars<'static> {
        let escape = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                ESCAPED_EXTENSIONS
                    .iter()
                    .any(|candidate| ext.eq_ignore_ascii_case(candidate))
            });
        if escape {
            &self.escaped
        } else {
            &self.plain
        }
    }

    /// Render a single template file with the given fields
    pub fn render_file(&self, path: &Path, fields: &Fields) -> Result<String> {
        let source = std::fs::read_to_string(path).map_err(|source| LlmccError::TemplateRead {
            path: path.to_path_buf(),
            source,
        })?;

        self.registry_for(path)
            .render_template(&source, fields)
            .map_err(|source| LlmccError::TemplateRender {
                path: path.to_path_buf(),
                source: Box::new(source),
            })
    }

    /// Render every template in order and concatenate the results
    pub fn render_files<P: AsRef<Path>>(&self, paths: &[P], fields: &Fields) -> Result<String> {
        let mut prompt = String::new();
        for path in paths {
            let path = path.as_ref();
            let rendered = self.render_file(path, fields)?;
            tracing::debug!(
                template = %path.display(),
                rendered_chars = rendered.len(),
                "Rendered template"
            );
            prompt.push_str(&rendered);
        }
        Ok(prompt)
    }
}

impl Default for Templates {
    fn default() -> Self {
        Self::new(false)
    }
}
