use crate::tui::state::ModelPickerModal;
use crate::ui::theme::Theme;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use super::{ModalSize, open_modal};

pub fn render_model_picker_modal(frame: &mut Frame, area: Rect, modal: &ModelPickerModal) {
    let rows = modal.total_count() as u16 + 1;
    let size = ModalSize {
        width_percent: 50,
        min_width: 40,
        max_width: 70,
        height: rows.min(area.height.saturating_sub(4)) + 2,
    };
    let inner_area = open_modal(
        frame,
        area,
        &size,
        "Select Model",
        Theme::primary(),
        "↑/↓ move • Enter select • Esc cancel",
    );

    render_model_list(frame, inner_area, modal);
}

fn render_model_list(frame: &mut Frame, chunk: Rect, modal: &ModelPickerModal) {
    let visible = usize::from(chunk.height.saturating_sub(1)).max(1);
    let offset = modal.selected.saturating_sub(visible - 1);

    for (row, (index, model)) in modal
        .models
        .iter()
        .enumerate()
        .skip(offset)
        .take(visible)
        .enumerate()
    {
        let is_selected = index == modal.selected;
        let (prefix, style) = if is_selected {
            ("  ▸ ", Theme::primary_bold())
        } else {
            ("    ", ratatui::style::Style::default())
        };

        let line = Line::from(vec![
            Span::styled(prefix, style),
            Span::styled(model.name.as_str(), style),
            Span::styled(format!("  {}", model.detail), Theme::muted()),
        ]);

        frame.render_widget(
            Paragraph::new(line),
            Rect {
                x: chunk.x,
                y: chunk.y + row as u16,
                width: chunk.width,
                height: 1,
            },
        );
    }
}
