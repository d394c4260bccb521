use crate::tui::app::{SLASH_COMMANDS, SlashCommandInfo};

/// Slash commands matching what has been typed so far.
///
/// Matching stops at the first space: once an argument is being typed the
/// popup closes.
#[derive(Debug, Clone, Default)]
pub struct SlashCompletion {
    matches: Vec<&'static SlashCommandInfo>,
    selected: usize,
}

impl SlashCompletion {
    pub fn refresh(&mut self, text: &str) {
        self.selected = 0;
        self.matches = if text.starts_with('/') && !text.contains(char::is_whitespace) {
            SLASH_COMMANDS
                .iter()
                .filter(|info| info.name.starts_with(text))
                .collect()
        } else {
            Vec::new()
        };
    }

    pub fn close(&mut self) {
        self.matches.clear();
        self.selected = 0;
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        !self.matches.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    #[must_use]
    pub const fn selected_index(&self) -> usize {
        self.selected
    }

    #[must_use]
    pub fn selected(&self) -> Option<&'static SlashCommandInfo> {
        self.matches.get(self.selected).copied()
    }

    pub fn select_next(&mut self) {
        if self.is_open() {
            self.selected = (self.selected + 1) % self.matches.len();
        }
    }

    pub fn select_prev(&mut self) {
        if self.is_open() {
            self.selected = self
                .selected
                .checked_sub(1)
                .unwrap_or(self.matches.len() - 1);
        }
    }

    /// Up to `rows` matches around the selection, with their indexes.
    pub fn window(&self, rows: usize) -> impl Iterator<Item = (usize, &'static SlashCommandInfo)> + '_ {
        let first = self.selected.saturating_sub(rows.saturating_sub(1));
        self.matches
            .iter()
            .copied()
            .enumerate()
            .skip(first)
            .take(rows)
    }
}
