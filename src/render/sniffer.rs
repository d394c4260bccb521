//! Keyword-frequency language guessing for untagged fenced blocks.

pub const FALLBACK_LANGUAGE: &str = "text";

/// Languages are scored in this order; on equal non-zero scores the earlier
/// entry wins.
const SIGNATURES: &[(&str, &[&str])] = &[
    (
        "python",
        &[
            "def ", "import ", "from ", "print(", "self.", "elif ", "none", "__init__", "lambda ",
            "#!/usr/bin/env python",
        ],
    ),
    (
        "rust",
        &[
            "fn ", "let mut ", "impl ", "pub ", "use std", "println!", "match ", "->", "::", "&mut ",
        ],
    ),
    (
        "javascript",
        &[
            "function ", "const ", "console.log", "=>", "let ", "var ", "require(", "document.",
            "undefined",
        ],
    ),
    (
        "typescript",
        &["interface ", ": string", ": number", "export ", "type ", "implements ", "readonly "],
    ),
    ("java", &["public class", "static void", "system.out", "private ", "new ", "@override"]),
    ("c", &["#include", "int main", "printf(", "malloc(", "->", "sizeof("]),
    ("cpp", &["std::", "cout", "#include <iostream>", "template<", "namespace ", "nullptr"]),
    ("go", &["func ", "package ", ":=", "fmt.", "go ", "defer "]),
    (
        "shell",
        &[
            "#!/bin/bash", "#!/bin/sh", "sudo ", "apt ", "echo ", "cd ", "ls ", "grep ", "export ",
            "mkdir ", "rm ", "chmod ", "$(", "| ", "&& ",
        ],
    ),
    ("sql", &["select ", "from ", "where ", "insert into", "create table", "join "]),
    ("html", &["<html", "<div", "</", "<body", "<head", "<!doctype"]),
    ("css", &["{", "color:", "margin:", "padding:", "display:", "font-"]),
];

/// Guesses the language of `code`, returning [`FALLBACK_LANGUAGE`] when no
/// signature matches.
#[must_use]
pub fn detect(code: &str) -> &'static str {
    let haystack = code.to_lowercase();
    if haystack.trim().is_empty() {
        return FALLBACK_LANGUAGE;
    }

    let mut best = FALLBACK_LANGUAGE;
    let mut best_score = 0;

    for (language, patterns) in SIGNATURES {
        let score: usize = patterns
            .iter()
            .map(|pattern| haystack.matches(pattern).count())
            .sum();

        if score > best_score {
            best = language;
            best_score = score;
        }
    }

    best
}
