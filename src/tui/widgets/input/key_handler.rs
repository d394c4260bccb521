use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::paste::PLACEHOLDER_THRESHOLD;
use super::{InputAction, InputWidget};

impl InputWidget<'_> {
    pub fn handle_key(&mut self, key: KeyEvent) -> InputAction {
        if self.completion.is_open()
            && let Some(action) = self.handle_completion_key(key)
        {
            return action;
        }

        match (key.code, key.modifiers) {
            (KeyCode::Enter, KeyModifiers::NONE) if self.is_empty() => InputAction::Continue,
            (KeyCode::Enter, KeyModifiers::NONE) => InputAction::Submit(self.take()),
            (KeyCode::Enter, m) if m.intersects(KeyModifiers::SHIFT | KeyModifiers::ALT) => {
                self.textarea.insert_newline();
                self.completion.close();
                InputAction::Continue
            }

            (KeyCode::Up, KeyModifiers::NONE) if self.cursor_on_first_line() => {
                InputAction::HistoryPrev
            }
            (KeyCode::Down, KeyModifiers::NONE) if self.cursor_on_last_line() => {
                InputAction::HistoryNext
            }

            (KeyCode::Char('k' | 'u'), KeyModifiers::CONTROL) => {
                self.clear();
                InputAction::Clear
            }

            (KeyCode::Esc, _) => InputAction::Cancel,

            _ => {
                self.textarea.input(key);
                let text = self.raw_text();
                self.completion.refresh(&text);
                InputAction::Continue
            }
        }
    }

    /// Keys the completion popup consumes. `None` lets the key fall through
    /// to the editor.
    fn handle_completion_key(&mut self, key: KeyEvent) -> Option<InputAction> {
        match key.code {
            KeyCode::Down | KeyCode::Tab if key.modifiers == KeyModifiers::NONE => {
                self.completion.select_next();
            }
            KeyCode::Up | KeyCode::BackTab => self.completion.select_prev(),
            KeyCode::Esc => self.completion.close(),
            KeyCode::Right => self.accept_completion(),
            KeyCode::Enter if key.modifiers == KeyModifiers::NONE => {
                return Some(self.submit_completion());
            }
            _ => return None,
        }
        Some(InputAction::Continue)
    }

    fn accept_completion(&mut self) {
        if let Some(info) = self.completion.selected() {
            self.set_text(&format!("{} ", info.name));
            self.completion.close();
        }
    }

    /// Commands that need an argument are completed rather than sent.
    fn submit_completion(&mut self) -> InputAction {
        match self.completion.selected() {
            Some(info) if info.takes_argument => {
                self.accept_completion();
                InputAction::Continue
            }
            Some(info) => {
                self.clear();
                InputAction::Submit(info.name.to_string())
            }
            None => InputAction::Continue,
        }
    }

    pub fn handle_paste(&mut self, text: String) -> InputAction {
        self.completion.close();

        let text = text.replace("\r\n", "\n").replace('\r', "\n");
        if text.chars().count() > PLACEHOLDER_THRESHOLD {
            let marker = self.pastes.stash(text);
            self.textarea.insert_str(marker);
        } else {
            self.textarea.insert_str(text);
        }

        InputAction::Continue
    }
}
