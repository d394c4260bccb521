mod action;
mod completion;
mod key_handler;
mod paste;
mod render;

pub use action::InputAction;

use completion::SlashCompletion;
use paste::PasteStash;

use crate::ui::theme::Theme;
use ratatui::style::Style;
use tui_textarea::{CursorMove, TextArea};

/// Multi-line prompt editor with slash-command completion.
pub struct InputWidget<'a> {
    textarea: TextArea<'a>,
    completion: SlashCompletion,
    pastes: PasteStash,
}

impl InputWidget<'_> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            textarea: blank_textarea(),
            completion: SlashCompletion::default(),
            pastes: PasteStash::default(),
        }
    }

    /// The full input, with stashed pastes expanded.
    #[must_use]
    pub fn text(&self) -> String {
        self.pastes.expand(&self.raw_text())
    }

    fn raw_text(&self) -> String {
        self.textarea.lines().join("\n")
    }

    /// Replaces the content and puts the cursor at the very end.
    pub fn set_text(&mut self, text: &str) {
        let mut textarea = TextArea::new(text.lines().map(str::to_owned).collect());
        style_textarea(&mut textarea);
        textarea.move_cursor(CursorMove::Bottom);
        textarea.move_cursor(CursorMove::End);

        self.textarea = textarea;
        self.pastes.clear();
        self.completion.refresh(text);
    }

    pub fn clear(&mut self) {
        self.textarea = blank_textarea();
        self.completion.close();
        self.pastes.clear();
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.textarea.lines().iter().all(String::is_empty)
    }

    /// Rows the editor needs to show its content without scrolling.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.textarea.lines().len().max(1)
    }

    pub fn take(&mut self) -> String {
        let text = self.text();
        self.clear();
        text
    }

    fn cursor_on_first_line(&self) -> bool {
        self.textarea.cursor().0 == 0
    }

    fn cursor_on_last_line(&self) -> bool {
        self.textarea.cursor().0 + 1 >= self.textarea.lines().len()
    }
}

impl Default for InputWidget<'_> {
    fn default() -> Self {
        Self::new()
    }
}

fn blank_textarea() -> TextArea<'static> {
    let mut textarea = TextArea::default();
    textarea.set_placeholder_text("Ask something, or / for commands");
    textarea.set_placeholder_style(Theme::muted());
    style_textarea(&mut textarea);
    textarea
}

fn style_textarea(textarea: &mut TextArea<'_>) {
    textarea.set_cursor_line_style(Style::default());
    textarea.set_cursor_style(Theme::white());
}
