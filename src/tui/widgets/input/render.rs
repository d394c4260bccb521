use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Layout, Position, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Widget};

use super::InputWidget;
use crate::tui::app::SlashCommandInfo;
use crate::ui::theme::{BoxChars, Theme};

const VISIBLE_SUGGESTIONS: usize = 5;
const PROMPT_WIDTH: u16 = 2;

impl InputWidget<'_> {
    /// Draws the editor below a rule. While a reply streams the rule carries
    /// a stop hint; the slash-command popup opens above the box.
    pub fn render(&mut self, area: Rect, frame: &mut Frame, streaming: bool) {
        let [rule, body] = Layout::vertical([Constraint::Length(1), Constraint::Min(1)]).areas(area);
        let [prompt, editor] =
            Layout::horizontal([Constraint::Length(PROMPT_WIDTH), Constraint::Min(1)]).areas(body);

        self.rule_line(rule.width, streaming)
            .render(rule, frame.buffer_mut());
        Paragraph::new(self.prompt_span()).render(prompt, frame.buffer_mut());
        self.render_editor(editor, frame);

        if self.completion.is_open() {
            self.render_completion(area, frame.buffer_mut());
        }
    }

    fn rule_line(&self, width: u16, streaming: bool) -> Line<'static> {
        let hint = if streaming {
            Some(Span::styled(" Esc stops the reply ", Theme::warning()))
        } else if self.line_count() > 1 {
            Some(Span::styled(
                format!(" {} lines, Shift+Enter for more ", self.line_count()),
                Theme::muted(),
            ))
        } else {
            None
        };

        let rule_width = usize::from(width).saturating_sub(hint.as_ref().map_or(0, Span::width));
        let mut spans = vec![Span::styled("─".repeat(rule_width), Theme::border())];
        spans.extend(hint);
        Line::from(spans)
    }

    fn prompt_span(&self) -> Span<'static> {
        if self.text().starts_with('/') {
            Span::styled(format!("{} ", BoxChars::ARROW_RIGHT), Theme::secondary())
        } else {
            Span::styled("> ", Theme::white())
        }
    }

    fn render_editor(&mut self, area: Rect, frame: &mut Frame) {
        self.textarea.set_block(Block::default().borders(Borders::NONE));
        frame.render_widget(&self.textarea, area);

        let (row, col) = self.textarea.cursor();
        let row = u16::try_from(row).unwrap_or(u16::MAX).min(area.height.saturating_sub(1));
        let col = u16::try_from(col).unwrap_or(u16::MAX).min(area.width.saturating_sub(1));
        frame.set_cursor_position(Position::new(area.x + col, area.y + row));
    }

    fn render_completion(&self, area: Rect, buf: &mut Buffer) {
        let shown = self.completion.len().min(VISIBLE_SUGGESTIONS);
        let height = shown as u16 + 2;
        if area.y < height {
            return;
        }

        let popup = Rect {
            x: area.x + PROMPT_WIDTH,
            y: area.y - height,
            width: 60.min(area.width.saturating_sub(2 * PROMPT_WIDTH)),
            height,
        };

        let selected = self.completion.selected_index();
        let lines: Vec<Line> = self
            .completion
            .window(VISIBLE_SUGGESTIONS)
            .map(|(i, info)| suggestion_line(info, i == selected))
            .collect();

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Theme::primary())
            .border_set(ratatui::symbols::border::ROUNDED)
            .title(format!(" {}/{} ", selected + 1, self.completion.len()));

        Clear.render(popup, buf);
        Paragraph::new(lines).block(block).render(popup, buf);
    }
}

fn suggestion_line(info: &SlashCommandInfo, selected: bool) -> Line<'static> {
    let (marker, style) = if selected {
        (BoxChars::ARROW_RIGHT, Theme::primary_bold())
    } else {
        (" ", Theme::off_white())
    };

    Line::from(vec![
        Span::styled(format!("{marker} "), Theme::primary()),
        Span::styled(format!("{:<14}", info.usage()), style),
        Span::styled(info.description, Theme::muted()),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_of(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn rule_fills_the_width() {
        let widget = InputWidget::new();
        let line = widget.rule_line(30, false);
        assert_eq!(line.width(), 30);
    }

    #[test]
    fn streaming_rule_shows_stop_hint() {
        let widget = InputWidget::new();
        let line = widget.rule_line(50, true);

        assert!(text_of(&line).ends_with("Esc stops the reply "));
        assert_eq!(line.width(), 50);
    }

    #[test]
    fn slash_input_switches_prompt() {
        let mut widget = InputWidget::new();
        assert_eq!(widget.prompt_span().content, "> ");

        widget.set_text("/run 1");
        assert_eq!(widget.prompt_span().content, "❯ ");
    }

    #[test]
    fn selected_suggestion_is_marked() {
        let info = SlashCommandInfo {
            name: "/run",
            argument: Some("N"),
            description: "run a code block",
            takes_argument: true,
        };
        assert!(text_of(&suggestion_line(&info, true)).starts_with("❯ /run N"));
        assert!(text_of(&suggestion_line(&info, false)).starts_with("  /run N"));
    }
}
