use regex::Regex;
use std::sync::LazyLock;

use super::sniffer;

pub const FENCE: &str = "```";

const SHELL_LANGUAGES: &[&str] = &["shell", "sh", "bash", "zsh", "console", "shell-session"];

static FENCED_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```(?:([\w+#.-]+)\n|\n?)(.*?)```").expect("valid regex")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    pub language: String,
    /// Body with surrounding whitespace trimmed.
    pub content: String,
    /// The exact fenced text this block was cut from.
    pub source: String,
}

impl CodeBlock {
    #[must_use]
    pub fn is_shell(&self) -> bool {
        SHELL_LANGUAGES.contains(&self.language.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Plain(String),
    Code(CodeBlock),
}

impl Segment {
    #[must_use]
    pub fn source(&self) -> &str {
        match self {
            Self::Plain(text) => text,
            Self::Code(block) => &block.source,
        }
    }

    #[must_use]
    pub const fn as_code(&self) -> Option<&CodeBlock> {
        match self {
            Self::Code(block) => Some(block),
            Self::Plain(_) => None,
        }
    }
}

/// Cuts `text` into plain and fenced-code segments, left to right.
///
/// A dangling opening fence never matches, so its text stays inside the
/// surrounding plain segment.
#[must_use]
pub fn split(text: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut cursor = 0;

    for captures in FENCED_BLOCK.captures_iter(text) {
        let Some(whole) = captures.get(0) else {
            continue;
        };

        if whole.start() > cursor {
            segments.push(Segment::Plain(text[cursor..whole.start()].to_string()));
        }

        let tag = captures.get(1).map_or("", |m| m.as_str());
        let content = captures.get(2).map_or("", |m| m.as_str()).trim();
        let language = if tag.is_empty() {
            sniffer::detect(content).to_string()
        } else {
            tag.to_string()
        };

        segments.push(Segment::Code(CodeBlock {
            language,
            content: content.to_string(),
            source: whole.as_str().to_string(),
        }));

        cursor = whole.end();
    }

    if cursor < text.len() {
        segments.push(Segment::Plain(text[cursor..].to_string()));
    }

    segments
}

/// Inverse of [`split`]: concatenates segments back into the source text.
#[must_use]
pub fn join(segments: &[Segment]) -> String {
    segments.iter().map(Segment::source).collect()
}

#[must_use]
pub fn count_fences(text: &str) -> usize {
    text.matches(FENCE).count()
}

/// True when every opened fence has been closed and at least one block exists.
#[must_use]
pub fn has_complete_blocks(text: &str) -> bool {
    let fences = count_fences(text);
    fences >= 2 && fences % 2 == 0
}
