use ratatui::style::Style;
use unicode_width::UnicodeWidthStr;

use crate::ui::theme::Theme;

/// Severity of a line the app writes into the chat pane itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Warning,
    Error,
}

impl MessageLevel {
    #[must_use]
    pub const fn glyph(self) -> &'static str {
        match self {
            Self::Info => "·",
            Self::Warning => "!",
            Self::Error => "✗",
        }
    }

    /// Columns taken by the glyph and the space after it, for hanging
    /// indents on continuation lines.
    #[must_use]
    pub fn lead_width(self) -> usize {
        self.glyph().width() + 1
    }

    #[must_use]
    pub const fn style(self) -> Style {
        match self {
            Self::Info => Theme::muted(),
            Self::Warning => Theme::warning(),
            Self::Error => Theme::error(),
        }
    }
}
