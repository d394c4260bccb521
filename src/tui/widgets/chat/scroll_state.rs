/// Where the chat viewport is anchored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Anchor {
    /// Stick to the newest line, so streamed text stays in view.
    Follow,
    /// Held at a line offset by the user.
    Pinned(usize),
}

/// Scroll position of the chat transcript.
///
/// The viewport follows the bottom until the user scrolls. Scrolling back
/// down to the end resumes following.
#[derive(Debug, Clone)]
pub struct ScrollState {
    anchor: Anchor,
    total_lines: usize,
    viewport_height: usize,
}

impl ScrollState {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            anchor: Anchor::Follow,
            total_lines: 0,
            viewport_height: 0,
        }
    }

    /// First visible line.
    #[must_use]
    pub const fn position(&self) -> usize {
        match self.anchor {
            Anchor::Follow => self.bottom(),
            Anchor::Pinned(offset) => offset,
        }
    }

    #[must_use]
    pub const fn is_following(&self) -> bool {
        matches!(self.anchor, Anchor::Follow)
    }

    /// Lines below the viewport that the user has not scrolled to.
    #[must_use]
    pub const fn lines_below(&self) -> usize {
        self.bottom().saturating_sub(self.position())
    }

    /// Records the transcript and viewport size from the latest frame.
    pub fn update(&mut self, total_lines: usize, viewport_height: usize) {
        self.total_lines = total_lines;
        self.viewport_height = viewport_height;
        if let Anchor::Pinned(offset) = self.anchor {
            self.pin(offset);
        }
    }

    pub const fn follow(&mut self) {
        self.anchor = Anchor::Follow;
    }

    pub fn scroll_to_top(&mut self) {
        self.pin(0);
    }

    pub fn scroll_up(&mut self, lines: usize) {
        self.pin(self.position().saturating_sub(lines));
    }

    pub fn scroll_down(&mut self, lines: usize) {
        self.pin(self.position() + lines);
    }

    fn pin(&mut self, offset: usize) {
        let bottom = self.bottom();
        self.anchor = if offset >= bottom {
            Anchor::Follow
        } else {
            Anchor::Pinned(offset)
        };
    }

    const fn bottom(&self) -> usize {
        self.total_lines.saturating_sub(self.viewport_height)
    }
}

impl Default for ScrollState {
    fn default() -> Self {
        Self::new()
    }
}
