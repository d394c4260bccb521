mod confirm_run;
mod model_picker;

pub use confirm_run::render_confirm_run_modal;
pub use model_picker::render_model_picker_modal;

use crate::ui::theme::Theme;
use ratatui::Frame;
use ratatui::layout::{Constraint, Flex, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Clear};

/// Size of a dialog: a share of the screen width kept within bounds, and a
/// fixed content height.
struct ModalSize {
    width_percent: u16,
    min_width: u16,
    max_width: u16,
    height: u16,
}

impl ModalSize {
    fn place(&self, area: Rect) -> Rect {
        let share = u32::from(area.width) * u32::from(self.width_percent) / 100;
        let width = u16::try_from(share)
            .unwrap_or(u16::MAX)
            .clamp(self.min_width, self.max_width)
            .min(area.width);
        let [column] = Layout::horizontal([Constraint::Length(width)])
            .flex(Flex::Center)
            .areas(area);
        let [rect] = Layout::vertical([Constraint::Length(self.height.min(area.height))])
            .flex(Flex::Center)
            .areas(column);
        rect
    }
}

/// Clears a centered dialog, draws its frame with the key hint along the
/// bottom edge, and returns the area inside.
fn open_modal(
    frame: &mut Frame,
    area: Rect,
    size: &ModalSize,
    title: &str,
    accent: Style,
    hint: &str,
) -> Rect {
    let rect = size.place(area);
    let block = Block::default()
        .title(Line::styled(format!(" {title} "), Theme::primary_bold()))
        .title_bottom(Line::styled(format!(" {hint} "), Theme::muted()).centered())
        .borders(Borders::ALL)
        .border_style(accent)
        .border_set(ratatui::symbols::border::ROUNDED);

    let inner = block.inner(rect);
    frame.render_widget(Clear, rect);
    frame.render_widget(block, rect);
    inner
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modal_is_centered_and_clamped() {
        let size = ModalSize {
            width_percent: 50,
            min_width: 40,
            max_width: 70,
            height: 10,
        };

        let rect = size.place(Rect::new(0, 0, 200, 50));
        assert_eq!(rect.width, 70);
        assert_eq!(rect.x, 65);
        assert_eq!(rect.y, 20);

        let small = size.place(Rect::new(0, 0, 30, 6));
        assert_eq!(small.width, 30);
        assert_eq!(small.height, 6);
    }
}
