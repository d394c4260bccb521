use markdown::{ParseOptions, to_mdast};
use ratatui::text::Line;

use super::block::render_node;
use super::scope::Scope;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MarkdownError {
    #[error("failed to parse markdown: {0}")]
    Parse(String),
}

/// Renders the prose regions of a message. Parse failures are reported so
/// the caller can fall back to plain wrapping.
#[derive(Debug, Clone)]
pub struct MarkdownWidget {
    content: String,
    indent_level: usize,
    width: Option<usize>,
}

impl MarkdownWidget {
    #[must_use]
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            indent_level: 0,
            width: None,
        }
    }

    #[must_use]
    pub const fn indent(mut self, level: usize) -> Self {
        self.indent_level = level;
        self
    }

    #[must_use]
    pub const fn width(mut self, width: usize) -> Self {
        self.width = Some(width);
        self
    }

    pub fn render_to_lines(&self) -> Result<Vec<Line<'static>>, MarkdownError> {
        let ast = to_mdast(&self.content, &ParseOptions::default())
            .map_err(|e| MarkdownError::Parse(e.to_string()))?;

        Ok(render_node(&ast, &Scope::root(self.indent_level, self.width)))
    }
}
