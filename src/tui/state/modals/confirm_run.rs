use crate::render::CodeBlock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Choice {
    Run = 0,
    Cancel = 1,
}

impl Choice {
    const fn from_index(index: usize) -> Self {
        match index {
            0 => Self::Run,
            _ => Self::Cancel,
        }
    }
}

/// Asks before a code block from a reply is run on the host.
#[derive(Debug, Clone)]
pub struct ConfirmRunModal {
    /// 1-based number of the block in the chat.
    pub number: usize,
    pub block: CodeBlock,
    pub selected: usize,
}

impl ConfirmRunModal {
    #[must_use]
    pub const fn new(number: usize, block: CodeBlock) -> Self {
        Self {
            number,
            block,
            selected: Choice::Cancel as usize,
        }
    }

    pub const fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn select_next(&mut self) {
        self.selected = (self.selected + 1).min(Choice::Cancel as usize);
    }

    /// Runs regardless of the highlighted choice, for the `y` shortcut.
    #[must_use]
    pub fn into_block(self) -> CodeBlock {
        self.block
    }

    /// The block to run, or `None` when the user picked cancel.
    #[must_use]
    pub fn confirm(self) -> Option<CodeBlock> {
        match Choice::from_index(self.selected) {
            Choice::Run => Some(self.block),
            Choice::Cancel => None,
        }
    }
}
