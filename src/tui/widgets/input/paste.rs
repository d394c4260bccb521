/// Pastes longer than this are shown as a placeholder.
pub const PLACEHOLDER_THRESHOLD: usize = 200;

/// Large pastes kept out of the editor. The editor shows a short marker
/// that [`PasteStash::expand`] swaps back for the real text.
#[derive(Debug, Clone, Default)]
pub struct PasteStash {
    entries: Vec<(String, String)>,
    next_id: usize,
}

impl PasteStash {
    /// Stores `content` and returns the marker to insert in its place.
    pub fn stash(&mut self, content: String) -> String {
        let marker = format!("[paste#{}: {} chars]", self.next_id, content.chars().count());
        self.next_id += 1;
        self.entries.push((marker.clone(), content));
        marker
    }

    /// Replaces every marker still present in `text`. Markers the user
    /// deleted are simply gone.
    #[must_use]
    pub fn expand(&self, text: &str) -> String {
        self.entries
            .iter()
            .fold(text.to_string(), |acc, (marker, content)| {
                acc.replace(marker, content)
            })
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
