mod history;
mod messages;
mod modals;
mod streaming;

pub use history::InputHistory;
pub use modals::{ConfirmRunModal, Modal, ModalOutcome, ModelPickerModal, PickerModel};
pub use streaming::PendingExchange;

use crate::ollama::{LocalModel, PullProgress};
use crate::render::CodeBlock;
use crate::tui::widgets::{ChatEntry, ScrollState};
use crossterm::event::KeyEvent;
use std::time::{Duration, Instant};

/// Ticks per spinner frame; at the 16ms tick rate that is about 80ms.
const TICKS_PER_SPINNER_FRAME: usize = 5;

/// Everything the UI draws from. Only the UI task touches it.
pub struct AppState {
    pub should_quit: bool,
    pub ticks: usize,
    pub history: InputHistory,
    pub entries: Vec<ChatEntry>,
    pub scroll: ScrollState,
    pub pending: Option<PendingExchange>,
    pub active_conversation: Option<u64>,
    pub pull: Option<(String, PullProgress)>,
    pub modal: Option<Modal>,
    /// When the streaming reply was requested.
    busy_since: Option<Instant>,
}

impl AppState {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            should_quit: false,
            ticks: 0,
            history: InputHistory::new(),
            entries: Vec::new(),
            scroll: ScrollState::new(),
            pending: None,
            active_conversation: None,
            pull: None,
            modal: None,
            busy_since: None,
        }
    }

    pub const fn tick(&mut self) {
        self.ticks = self.ticks.wrapping_add(1);
    }

    #[must_use]
    pub const fn spinner_frame(&self) -> usize {
        self.ticks / TICKS_PER_SPINNER_FRAME
    }

    pub const fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn start_processing(&mut self) {
        self.busy_since = Some(Instant::now());
    }

    pub const fn stop_processing(&mut self) {
        self.busy_since = None;
    }

    #[must_use]
    pub const fn is_processing(&self) -> bool {
        self.busy_since.is_some()
    }

    #[must_use]
    pub fn elapsed(&self) -> Option<Duration> {
        self.busy_since.map(|start| start.elapsed())
    }

    #[must_use]
    pub const fn has_modal(&self) -> bool {
        self.modal.is_some()
    }

    pub fn show_model_picker(&mut self, models: &[LocalModel], current: Option<&str>) {
        self.modal = Some(Modal::ModelPicker(ModelPickerModal::new(models, current)));
    }

    pub fn show_confirm_run(&mut self, number: usize, block: CodeBlock) {
        self.modal = Some(Modal::ConfirmRun(ConfirmRunModal::new(number, block)));
    }

    pub fn dismiss_modal(&mut self) {
        self.modal = None;
    }

    /// Routes `key` to the open dialog. `None` when no dialog is open.
    pub fn modal_key(&mut self, key: KeyEvent) -> Option<ModalOutcome> {
        let (modal, outcome) = self.modal.take()?.handle_key(key);
        self.modal = modal;
        Some(outcome)
    }

    pub fn scroll_up(&mut self, lines: usize) {
        self.scroll.scroll_up(lines);
    }

    pub fn scroll_down(&mut self, lines: usize) {
        self.scroll.scroll_down(lines);
    }

    pub fn scroll_to_top(&mut self) {
        self.scroll.scroll_to_top();
    }

    pub const fn scroll_to_bottom(&mut self) {
        self.scroll.follow();
    }

    pub fn add_to_history(&mut self, input: String) {
        self.history.push(input);
    }

    pub fn history_prev(&mut self, current: &str) -> Option<String> {
        self.history.older(current)
    }

    pub fn history_next(&mut self) -> Option<String> {
        self.history.newer()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
