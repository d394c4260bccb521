use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::core::types::{Author, MessageId};
use crate::exec::ExecutionPolicy;

use super::splitter::{self, CodeBlock, FENCE, Segment};

/// Observer notified when the user asks to delete the message behind a view.
/// The receiver owns the persisted history and is responsible for saving.
pub trait DeleteHandler: Send + Sync {
    fn on_delete_requested(&self, view: &MessageView);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    Empty,
    Streaming,
    Reformatting,
    Rendered,
    Finalized,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum AppendOutcome {
    Appended,
    /// The delta closed a fence; the caller should run
    /// [`MessageView::check_reformat`] once the stream settles.
    ScheduleCheck,
    Dropped,
}

/// Visual projection of one chat message.
///
/// While a reply streams in, deltas are pushed onto a single trailing plain
/// region. Code blocks only get their own regions once a fence pair closes
/// and [`MessageView::check_reformat`] rebuilds the regions from the full text.
pub struct MessageView {
    id: MessageId,
    author: Author,
    regions: Vec<Segment>,
    tail: Option<usize>,
    state: ViewState,
    dirty: bool,
    reformat_count: usize,
    policy: ExecutionPolicy,
    seen_blocks: HashSet<String>,
    pending_executions: Vec<CodeBlock>,
    delete_handler: Option<Arc<dyn DeleteHandler>>,
}

impl MessageView {
    #[must_use]
    pub fn new(initial_text: &str, author: Author, id: MessageId) -> Self {
        let (regions, tail, state) = if initial_text.is_empty() {
            (vec![Segment::Plain(String::new())], Some(0), ViewState::Empty)
        } else {
            (splitter::split(initial_text), None, ViewState::Rendered)
        };

        Self {
            id,
            author,
            regions,
            tail,
            state,
            dirty: false,
            reformat_count: 0,
            policy: ExecutionPolicy::default(),
            seen_blocks: HashSet::new(),
            pending_executions: Vec::new(),
            delete_handler: None,
        }
    }

    #[must_use]
    pub const fn with_policy(mut self, policy: ExecutionPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub const fn message_id(&self) -> MessageId {
        self.id
    }

    #[must_use]
    pub const fn author(&self) -> Author {
        self.author
    }

    #[must_use]
    pub const fn state(&self) -> ViewState {
        self.state
    }

    #[must_use]
    pub fn regions(&self) -> &[Segment] {
        &self.regions
    }

    #[must_use]
    pub const fn reformat_count(&self) -> usize {
        self.reformat_count
    }

    #[must_use]
    pub const fn is_streaming(&self) -> bool {
        matches!(self.state, ViewState::Empty | ViewState::Streaming)
    }

    pub fn code_blocks(&self) -> impl Iterator<Item = &CodeBlock> {
        self.regions.iter().filter_map(Segment::as_code)
    }

    pub fn append_text(&mut self, delta: &str) -> AppendOutcome {
        if self.state == ViewState::Finalized {
            tracing::warn!(message = %self.id, "Dropping delta for finalized message");
            return AppendOutcome::Dropped;
        }
        if delta.is_empty() {
            return AppendOutcome::Appended;
        }

        let closes_fence = match self.tail.and_then(|idx| self.regions.get_mut(idx)) {
            Some(Segment::Plain(text)) => {
                text.push_str(delta);
                text.trim_end().ends_with(FENCE)
            }
            _ => {
                self.regions.push(Segment::Plain(delta.to_string()));
                self.tail = Some(self.regions.len() - 1);
                delta.trim_end().ends_with(FENCE)
            }
        };

        self.state = ViewState::Streaming;
        self.dirty = true;

        if closes_fence {
            AppendOutcome::ScheduleCheck
        } else {
            AppendOutcome::Appended
        }
    }

    /// Rebuilds all regions from the reconstructed text when every fence is
    /// closed. Returns whether a reformat happened.
    pub fn check_reformat(&mut self) -> bool {
        if !self.dirty {
            return false;
        }

        let text = self.current_text();
        if !splitter::has_complete_blocks(&text) {
            tracing::debug!(
                message = %self.id,
                fences = splitter::count_fences(&text),
                "Code block still open, skipping reformat"
            );
            return false;
        }

        let resume = if self.state == ViewState::Finalized {
            ViewState::Finalized
        } else {
            ViewState::Rendered
        };

        self.state = ViewState::Reformatting;
        self.regions = splitter::split(&text);
        self.tail = None;
        self.dirty = false;
        self.reformat_count += 1;
        self.queue_executions();
        self.state = resume;

        tracing::debug!(
            message = %self.id,
            regions = self.regions.len(),
            "Reformatted message"
        );
        true
    }

    /// Marks the end of generation and runs a last boundary check.
    pub fn finalize(&mut self) {
        self.state = ViewState::Finalized;
        self.check_reformat();
    }

    #[must_use]
    pub fn current_text(&self) -> String {
        splitter::join(&self.regions)
    }

    pub fn set_delete_handler(&mut self, handler: Arc<dyn DeleteHandler>) {
        self.delete_handler = Some(handler);
    }

    pub fn request_delete(&self) {
        match &self.delete_handler {
            Some(handler) => handler.on_delete_requested(self),
            None => tracing::debug!(message = %self.id, "Delete requested with no handler"),
        }
    }

    /// Shell blocks that auto-execution picked up since the last call.
    pub fn take_pending_executions(&mut self) -> Vec<CodeBlock> {
        std::mem::take(&mut self.pending_executions)
    }

    fn queue_executions(&mut self) {
        if !self.policy.auto_execute {
            return;
        }

        let fresh: Vec<CodeBlock> = self
            .regions
            .iter()
            .filter_map(Segment::as_code)
            .filter(|block| block.is_shell())
            .filter(|block| self.seen_blocks.insert(block.source.clone()))
            .cloned()
            .collect();

        self.pending_executions.extend(fresh);
    }
}

impl fmt::Debug for MessageView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageView")
            .field("id", &self.id)
            .field("author", &self.author)
            .field("state", &self.state)
            .field("regions", &self.regions.len())
            .field("reformat_count", &self.reformat_count)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    fn streaming_view() -> MessageView {
        MessageView::new("", Author::Assistant, MessageId::new(1))
    }

    #[test]
    fn empty_view_has_one_plain_region() {
        let view = streaming_view();
        assert_eq!(view.regions(), &[Segment::Plain(String::new())]);
        assert_eq!(view.state(), ViewState::Empty);
        assert!(view.current_text().is_empty());
    }

    #[test]
    fn initial_text_is_split() {
        let view = MessageView::new("a ```\nls\n``` b", Author::User, MessageId::new(2));
        assert_eq!(view.regions().len(), 3);
        assert_eq!(view.state(), ViewState::Rendered);
        assert!(view.author().is_user());
    }

    #[test]
    fn appends_grow_the_trailing_region() {
        let mut view = streaming_view();
        assert_eq!(view.append_text("Hello"), AppendOutcome::Appended);
        assert_eq!(view.append_text(", world"), AppendOutcome::Appended);

        assert_eq!(view.regions(), &[Segment::Plain("Hello, world".into())]);
        assert_eq!(view.state(), ViewState::Streaming);
    }

    #[test]
    fn char_by_char_matches_single_append() {
        let text = "Try this:\n```bash\necho hi\n```\nthen ```python\nprint(1)\n``` done";

        let mut chunked = streaming_view();
        for ch in text.chars() {
            if chunked.append_text(&ch.to_string()) == AppendOutcome::ScheduleCheck {
                chunked.check_reformat();
            }
        }
        chunked.finalize();

        let mut whole = streaming_view();
        let _ = whole.append_text(text);
        whole.finalize();

        assert_eq!(chunked.current_text(), text);
        assert_eq!(whole.current_text(), text);
    }

    #[test]
    fn open_fence_does_not_reformat() {
        let mut view = streaming_view();
        let _ = view.append_text("```python\nprint(1)\n");

        assert!(!view.check_reformat());
        assert_eq!(view.reformat_count(), 0);
    }

    #[test]
    fn closing_fence_triggers_exactly_one_reformat() {
        let mut view = streaming_view();
        assert_eq!(
            view.append_text("```python\nprint(1)\n"),
            AppendOutcome::Appended
        );
        assert_eq!(view.append_text("```"), AppendOutcome::ScheduleCheck);

        assert!(view.check_reformat());
        assert!(!view.check_reformat());
        view.finalize();

        assert_eq!(view.reformat_count(), 1);
        assert_eq!(view.state(), ViewState::Finalized);
        assert!(matches!(
            view.regions(),
            [Segment::Code(block)] if block.language == "python" && block.content == "print(1)"
        ));
    }

    #[test]
    fn appends_after_reformat_open_a_new_region() {
        let mut view = streaming_view();
        let _ = view.append_text("See ```\nls\n```");
        view.check_reformat();
        assert_eq!(view.regions().len(), 2);

        let _ = view.append_text(" and");
        let _ = view.append_text(" more");

        assert_eq!(view.regions().len(), 3);
        assert_eq!(view.regions()[2], Segment::Plain(" and more".into()));
        assert_eq!(view.current_text(), "See ```\nls\n``` and more");
    }

    #[test]
    fn finalized_view_drops_deltas() {
        let mut view = streaming_view();
        let _ = view.append_text("done");
        view.finalize();

        assert_eq!(view.append_text("late"), AppendOutcome::Dropped);
        assert_eq!(view.current_text(), "done");
    }

    #[test]
    fn execution_is_not_queued_by_default() {
        let mut view = streaming_view();
        let _ = view.append_text("```bash\necho hi\n```");
        view.check_reformat();

        assert!(view.take_pending_executions().is_empty());
    }

    #[test]
    fn auto_execution_deduplicates_blocks() {
        let mut view = streaming_view().with_policy(ExecutionPolicy {
            auto_execute: true,
        });

        let _ = view.append_text("```bash\necho hi\n```");
        view.check_reformat();
        let first = view.take_pending_executions();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].content, "echo hi");

        let _ = view.append_text(" again ```bash\necho hi\n``` and ```python\nprint(1)\n```");
        view.check_reformat();
        assert!(view.take_pending_executions().is_empty());
    }

    #[test]
    fn blocks_are_told_apart_by_their_exact_text() {
        let mut view = streaming_view().with_policy(ExecutionPolicy {
            auto_execute: true,
        });

        let _ = view.append_text("```bash\necho hi\n``` then ```sh\necho hi\n```");
        view.check_reformat();
        let queued = view.take_pending_executions();

        assert_eq!(queued.len(), 2);
        assert_eq!(queued[0].source, "```bash\necho hi\n```");
        assert_eq!(queued[1].source, "```sh\necho hi\n```");
    }

    struct Recorder(Mutex<Vec<MessageId>>);

    impl DeleteHandler for Recorder {
        fn on_delete_requested(&self, view: &MessageView) {
            self.0.lock().push(view.message_id());
        }
    }

    #[test]
    fn delete_request_reaches_handler() {
        let recorder = Arc::new(Recorder(Mutex::new(Vec::new())));
        let mut view = MessageView::new("bye", Author::User, MessageId::new(9));
        view.set_delete_handler(recorder.clone());

        view.request_delete();

        assert_eq!(*recorder.0.lock(), vec![MessageId::new(9)]);
    }
}
