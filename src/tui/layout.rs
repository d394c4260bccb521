use ratatui::layout::{Constraint, Layout, Rect};

const HEADER_HEIGHT: u16 = 3;
const STATUS_HEIGHT: u16 = 1;
const MIN_CHAT_HEIGHT: u16 = 3;
/// Editor rows shown before the input box scrolls internally.
const MAX_INPUT_ROWS: u16 = 8;

pub struct LayoutAreas {
    pub header: Rect,
    pub chat: Rect,
    pub input: Rect,
    pub status: Rect,
}

/// Splits the screen top to bottom: header, transcript, input box, status
/// line. The input box grows with `input_lines` (plus its separator row) and
/// gives way to the transcript on short terminals.
#[must_use]
pub fn calculate_layout(area: Rect, input_lines: usize) -> LayoutAreas {
    let wanted_rows = u16::try_from(input_lines)
        .unwrap_or(MAX_INPUT_ROWS)
        .clamp(2, MAX_INPUT_ROWS);
    let room = area
        .height
        .saturating_sub(HEADER_HEIGHT + STATUS_HEIGHT + MIN_CHAT_HEIGHT + 1);
    let input_height = 1 + wanted_rows.min(room.max(1));

    let [header, chat, input, status] = Layout::vertical([
        Constraint::Length(HEADER_HEIGHT),
        Constraint::Min(0),
        Constraint::Length(input_height),
        Constraint::Length(STATUS_HEIGHT),
    ])
    .areas(area);

    LayoutAreas {
        header,
        chat,
        input,
        status,
    }
}
