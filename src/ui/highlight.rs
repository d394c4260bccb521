use std::sync::LazyLock;

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use syntect::easy::HighlightLines;
use syntect::highlighting::{FontStyle, Style as SynStyle, Theme as SynTheme, ThemeSet};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

static SYNTAXES: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);
static THEMES: LazyLock<ThemeSet> = LazyLock::new(ThemeSet::load_defaults);

const THEME_NAME: &str = "base16-ocean.dark";

/// Maps the tags the language sniffer and chat models emit onto names
/// syntect knows.
fn normalize_lang(lang: &str) -> &str {
    match lang {
        "shell" | "sh" | "zsh" | "console" | "shell-session" => "bash",
        "cpp" | "c++" => "cpp",
        "javascript" | "node" => "js",
        "typescript" => "ts",
        "python3" | "py" => "python",
        "golang" => "go",
        "rs" => "rust",
        other => other,
    }
}

fn syntax_for_lang(lang: &str) -> Option<&'static SyntaxReference> {
    let lang = normalize_lang(lang);
    SYNTAXES
        .find_syntax_by_token(lang)
        .or_else(|| SYNTAXES.find_syntax_by_extension(lang))
        .or_else(|| SYNTAXES.find_syntax_by_name(lang))
}

fn theme() -> Option<&'static SynTheme> {
    THEMES
        .themes
        .get(THEME_NAME)
        .or_else(|| THEMES.themes.values().next())
}

fn span_from_syn((style, text): (SynStyle, &str)) -> Span<'static> {
    let fg = style.foreground;
    let mut out = Style::default().fg(Color::Rgb(fg.r, fg.g, fg.b));
    if style.font_style.contains(FontStyle::BOLD) {
        out = out.add_modifier(Modifier::BOLD);
    }
    if style.font_style.contains(FontStyle::ITALIC) {
        out = out.add_modifier(Modifier::ITALIC);
    }
    let content = text.strip_suffix('\n').unwrap_or(text);
    Span::styled(content.to_string(), out)
}

/// Highlights `content` line by line. Unknown languages come back as
/// unstyled lines with the text unchanged.
#[must_use]
pub fn highlight_code(content: &str, lang: &str) -> Vec<Line<'static>> {
    let (Some(syntax), Some(theme)) = (syntax_for_lang(lang), theme()) else {
        return plain_lines(content);
    };

    let mut highlighter = HighlightLines::new(syntax, theme);
    LinesWithEndings::from(content)
        .map(|line| match highlighter.highlight_line(line, &SYNTAXES) {
            Ok(ranges) => Line::from(ranges.into_iter().map(span_from_syn).collect::<Vec<_>>()),
            Err(_) => Line::from(line.trim_end_matches('\n').to_string()),
        })
        .collect()
}

fn plain_lines(content: &str) -> Vec<Line<'static>> {
    content.lines().map(|l| Line::from(l.to_string())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_of(lines: &[Line<'_>]) -> Vec<String> {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn highlighting_preserves_text() {
        let code = "fn main() {\n    println!(\"hi\");\n}";
        let lines = highlight_code(code, "rust");
        assert_eq!(text_of(&lines), vec!["fn main() {", "    println!(\"hi\");", "}"]);
    }

    #[test]
    fn shell_tag_resolves() {
        assert!(syntax_for_lang("shell").is_some());
        assert!(syntax_for_lang("python").is_some());
    }

    #[test]
    fn unknown_language_is_plain() {
        let lines = highlight_code("a\nb", "no-such-language");
        assert_eq!(text_of(&lines), vec!["a", "b"]);
        assert!(lines[0].spans.iter().all(|s| s.style == Style::default()));
    }
}
