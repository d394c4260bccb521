mod confirm_run;
mod model_picker;

pub use confirm_run::ConfirmRunModal;
pub use model_picker::{ModelPickerModal, PickerModel};

use crossterm::event::{KeyCode, KeyEvent};

use crate::render::CodeBlock;

/// The dialog in front of the chat. At most one is open at a time.
#[derive(Debug, Clone)]
pub enum Modal {
    ModelPicker(ModelPickerModal),
    ConfirmRun(ConfirmRunModal),
}

/// What a key press did to the open dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalOutcome {
    /// Still open.
    Open,
    Dismissed,
    ModelChosen(String),
    RunConfirmed(CodeBlock),
}

impl Modal {
    /// Applies `key`. Any outcome other than [`ModalOutcome::Open`] means
    /// the dialog should close; consuming `self` there keeps a closed
    /// dialog from lingering.
    #[must_use]
    pub fn handle_key(mut self, key: KeyEvent) -> (Option<Self>, ModalOutcome) {
        let outcome = match &mut self {
            Self::ModelPicker(picker) => match key.code {
                KeyCode::Up | KeyCode::Char('k') => {
                    picker.select_prev();
                    ModalOutcome::Open
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    picker.select_next();
                    ModalOutcome::Open
                }
                KeyCode::Enter => picker
                    .selected_model()
                    .map_or(ModalOutcome::Dismissed, ModalOutcome::ModelChosen),
                KeyCode::Esc => ModalOutcome::Dismissed,
                _ => ModalOutcome::Open,
            },
            Self::ConfirmRun(confirm) => match key.code {
                KeyCode::Up | KeyCode::Left | KeyCode::Char('k') => {
                    confirm.select_prev();
                    ModalOutcome::Open
                }
                KeyCode::Down | KeyCode::Right | KeyCode::Tab | KeyCode::Char('j') => {
                    confirm.select_next();
                    ModalOutcome::Open
                }
                KeyCode::Char('y' | '1') => ModalOutcome::RunConfirmed(confirm.clone().into_block()),
                KeyCode::Char('n' | '2') | KeyCode::Esc => ModalOutcome::Dismissed,
                KeyCode::Enter => confirm
                    .clone()
                    .confirm()
                    .map_or(ModalOutcome::Dismissed, ModalOutcome::RunConfirmed),
                _ => ModalOutcome::Open,
            },
        };

        let still_open = (outcome == ModalOutcome::Open).then_some(self);
        (still_open, outcome)
    }
}
