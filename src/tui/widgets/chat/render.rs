use ratatui::text::{Line, Span};

use super::ChatEntry;
use crate::core::types::Author;
use crate::exec::ExecutionResult;
use crate::render::{CodeBlock, MessageView, Segment};
use crate::ui::highlight::highlight_code;
use crate::ui::markdown::MarkdownWidget;
use crate::ui::notice::MessageLevel;
use crate::ui::theme::{BoxChars, Theme};

const MAX_OUTPUT_LINES: usize = 40;

impl ChatEntry {
    /// Renders the entry. Code blocks are labelled from `first_block`
    /// upwards so `/run N` can refer to them.
    pub fn render_to_lines(
        &self,
        width: u16,
        spinner_frame: usize,
        first_block: usize,
    ) -> Vec<Line<'static>> {
        match self {
            Self::Message(view) if view.author() == Author::User => render_user(view, width),
            Self::Message(view) => render_assistant(view, width, first_block, spinner_frame),
            Self::System { text, level } => render_system(text, *level),
            Self::Execution { command, results } => render_execution(command, results, width),
        }
    }
}

fn id_label(view: &MessageView) -> Span<'static> {
    Span::styled(format!("  {}", view.message_id()), Theme::muted())
}

fn render_user(view: &MessageView, width: u16) -> Vec<Line<'static>> {
    const PREFIX: &str = "> ";

    let text = view.current_text();
    let available_width = (width as usize).saturating_sub(PREFIX.len() + 1);
    let wrapped = textwrap::wrap(&text, available_width.max(1));

    let mut lines: Vec<Line<'static>> = wrapped
        .into_iter()
        .enumerate()
        .map(|(i, line)| {
            if i == 0 {
                Line::from(vec![
                    Span::styled(PREFIX.to_string(), Theme::user()),
                    Span::styled(line.to_string(), Theme::user()),
                    id_label(view),
                ])
            } else {
                Line::from(Span::styled(
                    format!("{:width$}{}", "", line, width = PREFIX.len()),
                    Theme::user(),
                ))
            }
        })
        .collect();

    if lines.is_empty() {
        lines.push(Line::from(vec![
            Span::styled(PREFIX.to_string(), Theme::user()),
            id_label(view),
        ]));
    }
    lines
}

fn render_assistant(
    view: &MessageView,
    width: u16,
    first_block: usize,
    spinner_frame: usize,
) -> Vec<Line<'static>> {
    let mut body = Vec::new();
    let mut block_number = first_block;

    for region in view.regions() {
        match region {
            Segment::Plain(text) => body.extend(render_plain(text, width)),
            Segment::Code(block) => {
                body.extend(render_code_block(block, block_number, width));
                block_number += 1;
            }
        }
    }

    let mut lines = add_prefix_to_lines(body);

    if view.is_streaming() {
        append_cursor(&mut lines, spinner_frame);
    }

    if let Some(first) = lines.first_mut() {
        first.spans.push(id_label(view));
    } else {
        lines.push(Line::from(vec![
            Span::styled("● ", Theme::off_white()),
            id_label(view),
        ]));
    }

    lines
}

fn render_plain(text: &str, width: u16) -> Vec<Line<'static>> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    if is_simple_text(text) {
        return wrap_plain(text, width);
    }

    let widget = MarkdownWidget::new(text)
        .indent(0)
        .width((width as usize).saturating_sub(2));

    match widget.render_to_lines() {
        Ok(lines) if !is_content_lost(text, &lines) => trim_trailing_empty_lines(lines),
        _ => wrap_plain(text, width),
    }
}

fn render_code_block(block: &CodeBlock, number: usize, width: u16) -> Vec<Line<'static>> {
    let mut lines = Vec::with_capacity(block.content.lines().count() + 2);

    let mut header = vec![
        Span::styled(format!("{} ", BoxChars::ROUND_TOP_LEFT), Theme::border()),
        Span::styled(format!("[{number}] "), Theme::code_label()),
        Span::styled(block.language.clone(), Theme::secondary()),
    ];
    if block.is_shell() {
        header.push(Span::styled(format!("  /run {number}"), Theme::muted()));
    }
    lines.push(Line::from(header));

    let max = (width as usize).saturating_sub(6);
    for highlighted in highlight_code(&block.content, &block.language) {
        let mut spans = vec![Span::styled(
            format!("{} ", BoxChars::VERTICAL),
            Theme::code_gutter(),
        )];
        spans.extend(clip_spans(highlighted.spans, max));
        lines.push(Line::from(spans));
    }

    lines.push(Line::from(Span::styled(
        BoxChars::ROUND_BOTTOM_LEFT.to_string(),
        Theme::border(),
    )));
    lines
}

/// Cuts spans to `max` display columns. Code lines are not wrapped.
fn clip_spans(spans: Vec<Span<'static>>, max: usize) -> Vec<Span<'static>> {
    use unicode_width::UnicodeWidthChar;

    let mut used = 0;
    let mut out = Vec::with_capacity(spans.len());

    for span in spans {
        let mut content = String::new();
        for ch in span.content.chars() {
            let w = ch.width().unwrap_or(0);
            if used + w > max {
                out.push(Span::styled(content, span.style));
                return out;
            }
            used += w;
            content.push(ch);
        }
        out.push(Span::styled(content, span.style));
    }
    out
}

fn render_system(text: &str, level: MessageLevel) -> Vec<Line<'static>> {
    let style = level.style();

    text.lines()
        .enumerate()
        .map(|(i, line)| {
            let lead = if i == 0 {
                format!("{} ", level.glyph())
            } else {
                " ".repeat(level.lead_width())
            };
            Line::from(vec![
                Span::styled(lead, style),
                Span::styled(line.to_string(), style),
            ])
        })
        .collect()
}

fn render_execution(command: &str, results: &[ExecutionResult], width: u16) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(vec![
        Span::styled(format!("{} $ ", BoxChars::ARROW_RIGHT), Theme::primary()),
        Span::styled(first_line(command), Theme::secondary()),
    ])];

    let wrap_width = (width as usize).saturating_sub(4).max(1);
    for result in results {
        let style = if result.is_success() {
            Theme::output()
        } else {
            Theme::error()
        };

        let text = result.to_string();
        let all: Vec<String> = text
            .lines()
            .flat_map(|l| textwrap::wrap(l, wrap_width))
            .map(|l| l.into_owned())
            .collect();

        for line in all.iter().take(MAX_OUTPUT_LINES) {
            lines.push(Line::from(Span::styled(format!("  {line}"), style)));
        }
        if all.len() > MAX_OUTPUT_LINES {
            lines.push(Line::from(Span::styled(
                format!("  ... ({} more lines)", all.len() - MAX_OUTPUT_LINES),
                Theme::muted(),
            )));
        }
    }

    lines
}

fn first_line(command: &str) -> String {
    let mut lines = command.lines();
    let first = lines.next().unwrap_or_default().to_string();
    if lines.next().is_some() {
        format!("{first} ...")
    } else {
        first
    }
}

fn is_simple_text(text: &str) -> bool {
    let trimmed = text.trim();

    !trimmed.contains('\n')
        && trimmed.len() < 80
        && !trimmed.contains('*')
        && !trimmed.contains('`')
        && !trimmed.contains('#')
        && !trimmed.contains('[')
}

fn is_content_lost(original: &str, rendered: &[Line<'_>]) -> bool {
    if !original.chars().any(char::is_alphanumeric) {
        return false;
    }

    !rendered
        .iter()
        .flat_map(|line| line.spans.iter())
        .any(|span| span.content.chars().any(char::is_alphanumeric))
}

fn trim_trailing_empty_lines(mut lines: Vec<Line<'static>>) -> Vec<Line<'static>> {
    while lines.last().is_some_and(|l| l.spans.is_empty()) {
        lines.pop();
    }
    lines
}

fn wrap_plain(text: &str, width: u16) -> Vec<Line<'static>> {
    let available = (width as usize).saturating_sub(4).max(1);
    text.trim()
        .lines()
        .flat_map(|line| textwrap::wrap(line, available))
        .map(|line| Line::from(line.into_owned()))
        .collect()
}

fn add_prefix_to_lines(lines: Vec<Line<'static>>) -> Vec<Line<'static>> {
    lines
        .into_iter()
        .enumerate()
        .map(|(i, line)| {
            let prefix = if i == 0 { "● " } else { "  " };
            let mut spans = vec![Span::styled(prefix, Theme::off_white())];
            spans.extend(line.spans.into_iter().map(|span| {
                if span.style == ratatui::style::Style::default() {
                    Span::styled(span.content, Theme::off_white())
                } else {
                    span
                }
            }));
            Line::from(spans)
        })
        .collect()
}

fn append_cursor(lines: &mut Vec<Line<'static>>, spinner_frame: usize) {
    let glyph = if spinner_frame % 2 == 0 { "▊" } else { " " };
    let cursor = Span::styled(glyph, Theme::primary());

    match lines.last_mut() {
        Some(last_line) => last_line.spans.push(cursor),
        None => lines.push(Line::from(vec![
            Span::styled("● ", Theme::off_white()),
            cursor,
        ])),
    }
}
