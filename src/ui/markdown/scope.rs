use ratatui::text::Span;

use crate::ui::theme::{BoxChars, Theme};

const DEFAULT_WIDTH: usize = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Margin {
    /// Nested list level.
    Indent,
    /// Blockquote bar.
    Quote,
}

impl Margin {
    const WIDTH: usize = 2;

    fn span(self) -> Span<'static> {
        match self {
            Self::Indent => Span::raw("  "),
            Self::Quote => Span::styled(format!("{} ", BoxChars::VERTICAL), Theme::border()),
        }
    }
}

/// The left margin and wrap width a block is rendered into. Each nested
/// list or quote pushes another two-column margin.
#[derive(Debug, Clone)]
pub struct Scope {
    margins: Vec<Margin>,
    width: usize,
}

impl Scope {
    #[must_use]
    pub fn root(indent: usize, width: Option<usize>) -> Self {
        Self {
            margins: vec![Margin::Indent; indent],
            width: width.unwrap_or(DEFAULT_WIDTH),
        }
    }

    /// Margin spans to start every line with.
    #[must_use]
    pub fn margin(&self) -> Vec<Span<'static>> {
        self.margins.iter().map(|m| m.span()).collect()
    }

    #[must_use]
    pub fn margin_width(&self) -> usize {
        self.margins.len() * Margin::WIDTH
    }

    /// Columns left for content after the margin.
    #[must_use]
    pub fn available_width(&self) -> usize {
        self.width.saturating_sub(self.margin_width())
    }

    #[must_use]
    pub fn indented(&self) -> Self {
        self.push(Margin::Indent)
    }

    #[must_use]
    pub fn quoted(&self) -> Self {
        self.push(Margin::Quote)
    }

    fn push(&self, margin: Margin) -> Self {
        let mut margins = self.margins.clone();
        margins.push(margin);
        Self {
            margins,
            width: self.width,
        }
    }
}
