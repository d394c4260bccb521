use markdown::mdast::{Code, Heading, List, ListItem, Node, Paragraph};
use ratatui::{
    style::Modifier,
    text::{Line, Span},
};
use textwrap::wrap;
use unicode_width::UnicodeWidthStr;

use crate::render::detect;
use crate::ui::highlight::highlight_code;
use crate::ui::theme::{BoxChars, Theme};

use super::inline::{collect_inline_spans, collect_text_from_nodes};
use super::scope::Scope;

pub fn render_node(node: &Node, scope: &Scope) -> Vec<Line<'static>> {
    match node {
        Node::Root(root) => render_children(&root.children, scope),

        Node::Heading(heading) => with_trailing_blank(render_heading(heading, scope)),

        Node::Paragraph(para) => with_trailing_blank(render_paragraph(para, scope)),

        Node::List(list) => with_trailing_blank(render_list(list, scope)),

        Node::ListItem(item) => render_list_item(item, scope),

        Node::Code(code) => with_trailing_blank(render_code_block(code, scope)),

        Node::Break(_) | Node::ThematicBreak(_) => vec![Line::default()],

        Node::Blockquote(quote) => {
            let mut lines = render_children(&quote.children, &scope.quoted());
            if lines.last().is_some_and(|l| l.spans.is_empty()) {
                lines.pop();
            }
            with_trailing_blank(lines)
        }

        _ => Vec::new(),
    }
}

fn render_children(children: &[Node], scope: &Scope) -> Vec<Line<'static>> {
    children
        .iter()
        .flat_map(|child| render_node(child, scope))
        .collect()
}

fn with_trailing_blank(mut lines: Vec<Line<'static>>) -> Vec<Line<'static>> {
    lines.push(Line::default());
    lines
}

fn line_in(scope: &Scope, content: impl IntoIterator<Item = Span<'static>>) -> Line<'static> {
    let mut spans = scope.margin();
    spans.extend(content);
    Line::from(spans)
}

fn render_heading(heading: &Heading, scope: &Scope) -> Vec<Line<'static>> {
    let text = collect_text_from_nodes(&heading.children);
    vec![line_in(
        scope,
        [Span::styled(text, Theme::primary().add_modifier(Modifier::BOLD))],
    )]
}

fn render_paragraph(para: &Paragraph, scope: &Scope) -> Vec<Line<'static>> {
    let spans = collect_inline_spans(&para.children);
    let full_text: String = spans.iter().map(|s| s.content.as_ref()).collect();

    // Inline styles survive only when the paragraph fits on one line.
    if !full_text.contains('\n') && full_text.width() <= scope.available_width() {
        return vec![line_in(scope, spans)];
    }

    wrap_in(&full_text, scope)
}

fn render_list(list: &List, scope: &Scope) -> Vec<Line<'static>> {
    let mut number = list.start.unwrap_or(1);
    let mut lines = Vec::new();

    for child in &list.children {
        if let Node::ListItem(item) = child {
            let marker = if list.ordered {
                number += 1;
                format!("{}. ", number - 1)
            } else {
                format!("{} ", BoxChars::DOT)
            };
            lines.extend(render_item_with_marker(item, &marker, scope));
        }
    }

    lines
}

fn render_list_item(item: &ListItem, scope: &Scope) -> Vec<Line<'static>> {
    render_item_with_marker(item, &format!("{} ", BoxChars::DOT), scope)
}

fn render_item_with_marker(item: &ListItem, marker: &str, scope: &Scope) -> Vec<Line<'static>> {
    let text = first_paragraph_text(&item.children);
    let marker_width = marker.width();
    let available = scope.available_width().saturating_sub(marker_width).max(1);

    let mut lines: Vec<Line<'static>> = wrap(&text, available)
        .into_iter()
        .enumerate()
        .map(|(i, row)| {
            let lead = if i == 0 {
                Span::styled(marker.to_owned(), Theme::primary())
            } else {
                Span::raw(" ".repeat(marker_width))
            };
            line_in(scope, [lead, Span::raw(row.into_owned())])
        })
        .collect();

    if lines.is_empty() {
        lines.push(line_in(scope, [Span::styled(marker.to_owned(), Theme::primary())]));
    }

    let nested = scope.indented();
    for child in &item.children {
        match child {
            Node::List(list) => lines.extend(render_list(list, &nested)),
            Node::Code(code) => lines.extend(render_code_block(code, &nested)),
            _ => {}
        }
    }

    lines
}

fn first_paragraph_text(children: &[Node]) -> String {
    children
        .iter()
        .find_map(|child| match child {
            Node::Paragraph(para) => Some(collect_text_from_nodes(&para.children)),
            _ => None,
        })
        .unwrap_or_default()
}

/// Fenced code the splitter has not cut out yet, e.g. a block whose closing
/// fence is still streaming in.
fn render_code_block(code: &Code, scope: &Scope) -> Vec<Line<'static>> {
    let lang = code
        .lang
        .as_deref()
        .filter(|lang| !lang.is_empty())
        .unwrap_or_else(|| detect(&code.value));

    let mut lines = Vec::with_capacity(code.value.lines().count() + 2);

    lines.push(line_in(
        scope,
        [Span::styled(
            format!("{} {lang}", BoxChars::ROUND_TOP_LEFT),
            Theme::border(),
        )],
    ));

    for highlighted in highlight_code(&code.value, lang) {
        let gutter = Span::styled(format!("{} ", BoxChars::VERTICAL), Theme::code_gutter());
        lines.push(line_in(
            scope,
            std::iter::once(gutter).chain(highlighted.spans),
        ));
    }

    lines.push(line_in(
        scope,
        [Span::styled(BoxChars::ROUND_BOTTOM_LEFT.to_string(), Theme::border())],
    ));

    lines
}

fn wrap_in(text: &str, scope: &Scope) -> Vec<Line<'static>> {
    let available = scope.available_width();
    if available == 0 {
        return Vec::new();
    }

    text.lines()
        .flat_map(|line| {
            if line.is_empty() {
                return vec![line_in(scope, [Span::raw("")])];
            }
            wrap(line, available)
                .into_iter()
                .map(|row| line_in(scope, [Span::raw(row.into_owned())]))
                .collect()
        })
        .collect()
}
