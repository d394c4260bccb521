use markdown::mdast::Node;
use ratatui::style::{Modifier, Style};
use ratatui::text::Span;

use crate::ui::theme::Theme;

/// Flattens inline markdown into styled spans. Nested markup accumulates:
/// `**bold _and italic_**` yields a span that is both.
pub fn collect_inline_spans(nodes: &[Node]) -> Vec<Span<'static>> {
    let mut spans = Vec::new();
    for node in nodes {
        walk(node, Style::default(), &mut spans);
    }
    spans
}

/// The same content with styling dropped.
pub fn collect_text_from_nodes(nodes: &[Node]) -> String {
    collect_inline_spans(nodes)
        .iter()
        .map(|span| span.content.as_ref())
        .collect()
}

fn walk(node: &Node, style: Style, out: &mut Vec<Span<'static>>) {
    let children = |extra: Style, out: &mut Vec<Span<'static>>| {
        for child in node.children().into_iter().flatten() {
            walk(child, style.patch(extra), out);
        }
    };

    match node {
        Node::Text(text) => out.push(Span::styled(text.value.clone(), style)),
        Node::InlineCode(code) => out.push(Span::styled(code.value.clone(), style.patch(Theme::secondary()))),
        Node::Break(_) => out.push(Span::styled(" ", style)),

        Node::Strong(_) => children(Style::new().add_modifier(Modifier::BOLD), out),
        Node::Emphasis(_) => children(Style::new().add_modifier(Modifier::ITALIC), out),
        Node::Delete(_) => children(Style::new().add_modifier(Modifier::CROSSED_OUT), out),

        Node::Link(link) => {
            let start = out.len();
            children(Style::new().add_modifier(Modifier::UNDERLINED), out);
            let label: String = out[start..].iter().map(|s| s.content.as_ref()).collect();
            // Autolinks already show the address.
            if label != link.url {
                out.push(Span::styled(format!(" ({})", link.url), Theme::muted()));
            }
        }

        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paragraph(text: &str) -> Vec<Node> {
        let ast = markdown::to_mdast(text, &markdown::ParseOptions::gfm()).unwrap();
        let Node::Root(root) = ast else { panic!("expected root") };
        let Some(Node::Paragraph(para)) = root.children.into_iter().next() else {
            panic!("expected paragraph")
        };
        para.children
    }

    #[test]
    fn inline_code_keeps_its_style() {
        let spans = collect_inline_spans(&paragraph("Use `ls -la` here"));
        let code = spans.iter().find(|s| s.content == "ls -la").unwrap();
        assert_eq!(code.style.fg, Theme::secondary().fg);
    }

    #[test]
    fn nested_markup_combines_modifiers() {
        let spans = collect_inline_spans(&paragraph("**bold _both_**"));
        let both = spans.iter().find(|s| s.content == "both").unwrap();

        assert!(both.style.add_modifier.contains(Modifier::BOLD));
        assert!(both.style.add_modifier.contains(Modifier::ITALIC));
    }

    #[test]
    fn links_show_their_target() {
        let text = collect_text_from_nodes(&paragraph("see [the docs](https://ollama.com)"));
        assert_eq!(text, "see the docs (https://ollama.com)");
    }

    #[test]
    fn autolinks_are_not_repeated() {
        let text = collect_text_from_nodes(&paragraph("<https://ollama.com>"));
        assert_eq!(text, "https://ollama.com");
    }

    #[test]
    fn empty_input_gives_no_spans() {
        assert!(collect_inline_spans(&[]).is_empty());
    }
}
