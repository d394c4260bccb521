use crate::ui::theme::{BoxChars, Theme};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

pub struct HeaderInfo {
    pub model: Option<String>,
    pub server_url: String,
    /// Id and title of the open conversation.
    pub conversation: Option<(u64, String)>,
}

pub fn render_header(frame: &mut Frame, area: Rect, info: &HeaderInfo) {
    let title = format!("Ollama Chat v{}", env!("CARGO_PKG_VERSION"));
    let model = info.model.as_deref().unwrap_or("no model");
    let subtitle = format!("Model: {model} | Server: {}", info.server_url);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(Theme::border())
        .border_set(ratatui::symbols::border::Set {
            bottom_left: BoxChars::ROUND_BOTTOM_LEFT,
            bottom_right: BoxChars::ROUND_BOTTOM_RIGHT,
            ..ratatui::symbols::border::ROUNDED
        });

    let mut title_spans = vec![
        Span::raw("  "),
        Span::styled(title, Theme::primary_bold()),
    ];
    match &info.conversation {
        Some((id, name)) => {
            title_spans.push(Span::styled(format!("  {} ", BoxChars::DOT), Theme::muted()));
            title_spans.push(Span::styled(format!("#{id} {name}"), Theme::secondary()));
        }
        None => {
            title_spans.push(Span::styled(format!("  {} new conversation", BoxChars::DOT), Theme::muted()));
        }
    }

    let lines = vec![
        Line::from(title_spans),
        Line::from(vec![
            Span::raw("  "),
            Span::styled(subtitle, Theme::muted()),
        ]),
    ];

    let paragraph = Paragraph::new(lines).block(block);
    frame.render_widget(paragraph, area);
}
