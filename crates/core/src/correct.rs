use crate::validate::{ValidationReport, Validator};
use serde::Serialize;
use std::collections::BTreeSet;
use trail_toolchain_diagnostics::{Category, Diagnostic};

/// Outcome of one correction pass followed by one re-validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrectionResult {
    /// The script that was finally validated (corrected or original).
    pub output: String,
    /// Report for `output`.
    pub report: ValidationReport,
    /// Whether a correction was applied.
    pub corrected: bool,
}

/// Attempt to repair the syntax issues in `script`.
///
/// Only syntax-category issues are considered; each flagged line is
/// rewritten by [`repair_line`] when a repair strategy applies. Line count
/// and line terminators are preserved, so issue line numbers stay valid.
/// Returns `None` when nothing changed.
pub fn attempt_correction(script: &str, issues: &[Diagnostic]) -> Option<String> {
    let targets: BTreeSet<usize> = issues
        .iter()
        .filter(|d| d.category == Category::Syntax)
        .map(|d| d.line_number)
        .collect();
    if targets.is_empty() {
        return None;
    }

    let mut out = String::with_capacity(script.len() + 16);
    for (idx, segment) in script.split_inclusive('\n').enumerate() {
        let line_number = idx + 1;
        if !targets.contains(&line_number) {
            out.push_str(segment);
            continue;
        }
        let (body, ending) = split_line_ending(segment);
        match repair_line(body) {
            Some(fixed) => {
                tracing::debug!(line = line_number, from = body.trim(), to = %fixed, "repaired line");
                out.push_str(&fixed);
                out.push_str(ending);
            }
            None => out.push_str(segment),
        }
    }

    (out != script).then_some(out)
}

/// Validate `script`; if it fails, attempt one correction and re-validate once.
pub fn correct_and_revalidate(validator: &Validator<'_>, script: &str) -> CorrectionResult {
    let report = validator.validate(script);
    if report.is_valid() {
        return CorrectionResult {
            output: script.to_string(),
            report,
            corrected: false,
        };
    }
    match attempt_correction(script, &report.issues) {
        Some(fixed) => {
            let report = validator.validate(&fixed);
            CorrectionResult {
                output: fixed,
                report,
                corrected: true,
            }
        }
        None => CorrectionResult {
            output: script.to_string(),
            report,
            corrected: false,
        },
    }
}

fn split_line_ending(segment: &str) -> (&str, &str) {
    let body_len = segment
        .strip_suffix("\r\n")
        .or_else(|| segment.strip_suffix('\n'))
        .map_or(segment.len(), str::len);
    segment.split_at(body_len)
}

#[derive(Clone, Copy)]
enum Keyword {
    Command,
    Activate,
    Input,
}

impl Keyword {
    fn parse(word: &str) -> Option<Self> {
        match word.to_ascii_lowercase().as_str() {
            "command" => Some(Keyword::Command),
            "activate" => Some(Keyword::Activate),
            "input" => Some(Keyword::Input),
            _ => None,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Keyword::Command => "Command",
            Keyword::Activate => "Activate",
            Keyword::Input => "Input",
        }
    }
}

/// Rewrite one malformed line into a recognized shape, if a strategy applies.
///
/// Strategies, first match wins:
/// - `#` and `//` comments become `!` comments.
/// - A `Command`, `Activate`, or `Input` keyword (any case, `~` optional)
///   is re-emitted with the canonical marker; quote characters become
///   backticks and bare words are backtick-quoted.
pub fn repair_line(line: &str) -> Option<String> {
    let text = line.trim();
    if let Some(rest) = text.strip_prefix("//").or_else(|| text.strip_prefix('#')) {
        let note = rest.trim();
        return Some(if note.is_empty() {
            "!".to_string()
        } else {
            format!("! {note}")
        });
    }

    let normalized: String = text
        .chars()
        .map(|c| match c {
            '\'' | '"' | '\u{2018}' | '\u{2019}' | '\u{201C}' | '\u{201D}' | '\u{00B4}' => '`',
            other => other,
        })
        .collect();
    let body = normalized.trim_start_matches('~').trim_start();
    let word_len = body
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(body.len());
    let keyword = Keyword::parse(&body[..word_len])?;
    let rest = &body[word_len..];
    if !rest.is_empty() && !rest.starts_with(|c: char| c.is_whitespace() || c == '`') {
        return None;
    }

    match keyword {
        Keyword::Command | Keyword::Activate => {
            let name = rest.trim_matches(|c: char| c == '`' || c.is_whitespace());
            if name.is_empty() || name.contains('`') || name.contains(char::is_whitespace) {
                return None;
            }
            Some(format!("~ {} `{}`", keyword.as_str(), name))
        }
        Keyword::Input => {
            let tokens = input_tokens(rest)?;
            let quoted: Vec<String> = tokens.iter().map(|t| format!("`{t}`")).collect();
            Some(format!("~ Input {}", quoted.join(" ")))
        }
    }
}

/// Backtick groups when present (text between groups must be blank),
/// otherwise whitespace-separated words.
fn input_tokens(rest: &str) -> Option<Vec<&str>> {
    let rest = rest.trim();
    if !rest.contains('`') {
        let words: Vec<&str> = rest.split_whitespace().collect();
        return (!words.is_empty()).then_some(words);
    }
    let parts: Vec<&str> = rest.split('`').collect();
    // An odd number of parts means every backtick is paired.
    if parts.len() % 2 == 0 {
        return None;
    }
    let mut tokens = Vec::new();
    for (i, part) in parts.iter().enumerate() {
        if i % 2 == 0 {
            if !part.trim().is_empty() {
                return None;
            }
        } else {
            let tok = part.trim();
            if tok.is_empty() {
                return None;
            }
            tokens.push(tok);
        }
    }
    Some(tokens)
}
