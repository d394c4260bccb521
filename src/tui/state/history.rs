use std::collections::VecDeque;

const CAPACITY: usize = 200;

/// Previously submitted prompts and commands, browsed with Up/Down.
///
/// Whatever was in the input box when browsing started is kept as a draft
/// and handed back when the user walks past the newest entry.
#[derive(Debug, Clone, Default)]
pub struct InputHistory {
    entries: VecDeque<String>,
    cursor: Option<usize>,
    draft: Option<String>,
}

impl InputHistory {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: VecDeque::new(),
            cursor: None,
            draft: None,
        }
    }

    /// Records a submission and ends any browsing in progress.
    pub fn push(&mut self, input: String) {
        self.cursor = None;
        self.draft = None;

        if input.trim().is_empty() || self.entries.back() == Some(&input) {
            return;
        }

        if self.entries.len() == CAPACITY {
            self.entries.pop_front();
        }
        self.entries.push_back(input);
    }

    /// Steps to an older entry. `current` is the input box content, saved
    /// as the draft on the first step.
    pub fn older(&mut self, current: &str) -> Option<String> {
        let newest = self.entries.len().checked_sub(1)?;

        let index = match self.cursor {
            None => {
                self.draft = Some(current.to_string());
                newest
            }
            Some(i) => i.saturating_sub(1),
        };

        self.cursor = Some(index);
        self.entries.get(index).cloned()
    }

    /// Steps to a newer entry, or back to the draft past the newest one.
    /// Returns `None` when not browsing.
    pub fn newer(&mut self) -> Option<String> {
        let index = self.cursor? + 1;

        if index < self.entries.len() {
            self.cursor = Some(index);
            return self.entries.get(index).cloned();
        }

        self.cursor = None;
        Some(self.draft.take().unwrap_or_default())
    }

    #[must_use]
    pub const fn is_browsing(&self) -> bool {
        self.cursor.is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history_of(items: &[&str]) -> InputHistory {
        let mut history = InputHistory::new();
        for item in items {
            history.push((*item).to_string());
        }
        history
    }

    #[test]
    fn skips_blank_and_repeated_input() {
        let history = history_of(&["", "  ", "/list", "/list", "hello", "/list"]);
        assert_eq!(history.len(), 3);
    }

    #[test]
    fn walks_back_and_restores_draft() {
        let mut history = history_of(&["one", "two"]);

        assert_eq!(history.older("half typed").as_deref(), Some("two"));
        assert_eq!(history.older("ignored").as_deref(), Some("one"));
        assert_eq!(history.older("ignored").as_deref(), Some("one"));
        assert!(history.is_browsing());

        assert_eq!(history.newer().as_deref(), Some("two"));
        assert_eq!(history.newer().as_deref(), Some("half typed"));
        assert!(!history.is_browsing());
        assert_eq!(history.newer(), None);
    }

    #[test]
    fn empty_history_does_nothing() {
        let mut history = InputHistory::new();
        assert_eq!(history.older("draft"), None);
        assert!(!history.is_browsing());
    }

    #[test]
    fn push_ends_browsing() {
        let mut history = history_of(&["one"]);
        let _ = history.older("");
        history.push("two".into());

        assert!(!history.is_browsing());
        assert_eq!(history.older("").as_deref(), Some("two"));
    }

    #[test]
    fn drops_oldest_past_capacity() {
        let mut history = InputHistory::new();
        for i in 0..CAPACITY + 5 {
            history.push(format!("prompt {i}"));
        }
        assert_eq!(history.len(), CAPACITY);

        let mut oldest = None;
        for _ in 0..CAPACITY {
            oldest = history.older("");
        }
        assert_eq!(oldest.as_deref(), Some("prompt 5"));
    }
}
