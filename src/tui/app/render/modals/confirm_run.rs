use crate::tui::state::ConfirmRunModal;
use crate::ui::highlight::highlight_code;
use crate::ui::theme::Theme;
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use super::{ModalSize, open_modal};

const MAX_PREVIEW_LINES: usize = 8;

pub fn render_confirm_run_modal(frame: &mut Frame, area: Rect, modal: &ConfirmRunModal) {
    let preview = highlight_code(&modal.block.content, &modal.block.language);
    let preview_height = preview.len().clamp(1, MAX_PREVIEW_LINES) as u16;
    let size = ModalSize {
        width_percent: 60,
        min_width: 50,
        max_width: 90,
        height: preview_height + 7,
    };
    let inner_area = open_modal(
        frame,
        area,
        &size,
        &format!("Run code block [{}]", modal.number),
        Theme::warning(),
        "y run • n/Esc cancel • ↑/↓ Enter choose",
    );

    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(preview_height),
        Constraint::Length(1),
        Constraint::Min(2),
    ])
    .split(inner_area);

    let label = Line::from(vec![
        Span::styled("Language: ", Theme::muted()),
        Span::styled(modal.block.language.as_str(), Theme::secondary()),
        Span::styled("  (runs on this machine)", Theme::muted()),
    ]);
    frame.render_widget(Paragraph::new(label), indent(chunks[0]));

    let hidden = preview.len().saturating_sub(MAX_PREVIEW_LINES);
    let mut lines: Vec<Line> = preview.into_iter().take(MAX_PREVIEW_LINES).collect();
    if hidden > 0
        && let Some(last) = lines.last_mut()
    {
        *last = Line::from(Span::styled(format!("… {} more lines", hidden + 1), Theme::muted()));
    }
    frame.render_widget(Paragraph::new(lines), indent(chunks[1]));

    render_options(frame, chunks[3], modal.selected);
}

fn indent(area: Rect) -> Rect {
    Rect {
        x: area.x + 1,
        width: area.width.saturating_sub(2),
        ..area
    }
}

fn render_options(frame: &mut Frame, chunk: Rect, selected: usize) {
    const OPTIONS: [(&str, &str, &str); 2] = [
        ("1", "Run", "Execute the block and show its output"),
        ("2", "Cancel", "Leave it alone"),
    ];

    for (i, (key, label, desc)) in OPTIONS.iter().enumerate() {
        if i as u16 >= chunk.height {
            break;
        }
        let is_selected = i == selected;

        let (prefix, key_style, label_style) = if is_selected {
            ("▸ ", Theme::primary_bold(), Theme::primary())
        } else {
            ("  ", Theme::muted(), ratatui::style::Style::default())
        };

        let line = Line::from(vec![
            Span::styled(prefix, key_style),
            Span::styled(format!("[{key}] "), key_style),
            Span::styled(*label, label_style),
            Span::styled(format!(" - {desc}"), Theme::muted()),
        ]);

        frame.render_widget(
            Paragraph::new(line),
            Rect {
                x: chunk.x + 1,
                y: chunk.y + i as u16,
                width: chunk.width.saturating_sub(2),
                height: 1,
            },
        );
    }
}
