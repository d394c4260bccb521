mod entry;
mod render;
mod scroll_state;

pub use entry::ChatEntry;
pub use scroll_state::ScrollState;

use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::widgets::{Paragraph, Widget};
use unicode_width::UnicodeWidthStr;

use crate::ui::theme::Theme;

pub struct ChatWidget<'a> {
    entries: &'a [ChatEntry],
    scroll: &'a mut ScrollState,
    spinner_frame: usize,
}

impl<'a> ChatWidget<'a> {
    #[must_use]
    pub const fn new(
        entries: &'a [ChatEntry],
        scroll: &'a mut ScrollState,
        spinner_frame: usize,
    ) -> Self {
        Self {
            entries,
            scroll,
            spinner_frame,
        }
    }

    pub fn render(self, area: Rect, buf: &mut Buffer) {
        if self.entries.is_empty() {
            render_welcome(area, buf);
            return;
        }

        let width = area.width.saturating_sub(2 * GUTTER);
        let transcript = transcript(self.entries, width, self.spinner_frame);

        let rows = area.height as usize;
        self.scroll.update(transcript.len(), rows);
        let first = self.scroll.position();

        transcript
            .iter()
            .skip(first)
            .take(rows)
            .zip(area.y..)
            .for_each(|(line, y)| {
                buf.set_line(area.x + GUTTER, y, line, width);
            });

        match self.scroll.lines_below() {
            0 => {}
            below => render_more_below(area, buf, below),
        }
    }
}

const GUTTER: u16 = 2;

/// Flattens every entry into display lines. Code block labels are numbered
/// across the whole chat, so `[N]` stays stable while scrolling.
fn transcript(entries: &[ChatEntry], width: u16, spinner_frame: usize) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let mut block_number = 1;

    for entry in entries {
        if !lines.is_empty() {
            lines.push(Line::default());
        }
        lines.extend(entry.render_to_lines(width, spinner_frame, block_number));
        block_number += entry.code_block_count();
    }

    lines
}

fn render_welcome(area: Rect, buf: &mut Buffer) {
    let centered = |text: &'static str, style: Style| Line::styled(text, style).alignment(Alignment::Center);

    Paragraph::new(vec![
        Line::default(),
        centered("ollama-chat", Theme::primary_bold()),
        Line::default(),
        centered(
            "Type a message and press Enter to talk to your local model.",
            Theme::muted(),
        ),
        centered(
            "Code blocks are numbered; /run N runs one after you confirm.",
            Theme::muted(),
        ),
        Line::default(),
        centered("/help for commands, Ctrl+C to exit", Theme::muted()),
    ])
    .render(area, buf);
}

fn render_more_below(area: Rect, buf: &mut Buffer, below: usize) {
    let label = format!("↓ {below} more ");
    let width = label.width() as u16;
    if area.width < width || area.height == 0 {
        return;
    }

    let spot = Rect::new(area.right() - width, area.bottom() - 1, width, 1);
    Line::styled(label, Theme::warning()).render(spot, buf);
}
