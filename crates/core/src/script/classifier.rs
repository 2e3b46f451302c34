use super::line::{LineKind, TrailLine};
use trail_toolchain_diagnostics::Span;

/// Marker for a command invocation line.
pub const COMMAND_MARKER: &str = "~ Command ";
/// Marker for an activation line.
pub const ACTIVATE_MARKER: &str = "~ Activate ";
/// Marker for an input line.
pub const INPUT_MARKER: &str = "~ Input ";
/// Leading character of a comment line.
pub const COMMENT_LEADER: char = '!';

/// Classify a trail script into one [`TrailLine`] per source line.
///
/// Lines are split on `\n` with a trailing `\r` dropped, so CRLF input
/// keeps the same numbering as LF input. Blank lines are kept and counted.
/// Classification never fails: text that matches no recognized shape
/// becomes [`LineKind::Invalid`].
pub fn classify(input: &str) -> Vec<TrailLine<'_>> {
    let mut lines = Vec::new();
    let mut offset = 0usize;
    for (idx, segment) in input.split('\n').enumerate() {
        let raw_text = segment.strip_suffix('\r').unwrap_or(segment);
        let leading = raw_text.len() - raw_text.trim_start().len();
        let text = raw_text.trim();
        let start = offset + leading;
        lines.push(TrailLine {
            line_number: idx + 1,
            raw_text,
            text,
            span: Span::new(start, start + text.len()),
            kind: classify_line(text),
        });
        offset += segment.len() + 1;
    }
    lines
}

/// Classify a single, already-trimmed line.
pub fn classify_line(text: &str) -> LineKind<'_> {
    if text.is_empty() {
        return LineKind::Blank;
    }
    if text.starts_with(COMMENT_LEADER) {
        return LineKind::Comment;
    }
    if let Some(rest) = text.strip_prefix(COMMAND_MARKER) {
        return match single_token(rest) {
            Some(name) => LineKind::CommandInvocation { name },
            None => LineKind::Invalid,
        };
    }
    if let Some(rest) = text.strip_prefix(ACTIVATE_MARKER) {
        return match single_token(rest) {
            Some(name) => LineKind::Activate { name },
            None => LineKind::Invalid,
        };
    }
    if let Some(rest) = text.strip_prefix(INPUT_MARKER)
        && let Some((value, extra_args)) = token_list(rest)
    {
        return LineKind::Input { value, extra_args };
    }
    LineKind::Invalid
}

/// Split `` `tok`rest `` into `tok` and `rest`. Tokens are non-empty.
fn quoted_token(s: &str) -> Option<(&str, &str)> {
    let inner = s.strip_prefix('`')?;
    let close = inner.find('`')?;
    if close == 0 {
        return None;
    }
    Some((&inner[..close], &inner[close + 1..]))
}

/// Exactly one quoted token and nothing after it.
fn single_token(s: &str) -> Option<&str> {
    let (tok, rest) = quoted_token(s)?;
    rest.is_empty().then_some(tok)
}

/// One or more quoted tokens separated by a single space.
fn token_list(s: &str) -> Option<(&str, Vec<&str>)> {
    let (first, mut rest) = quoted_token(s)?;
    let mut extra = Vec::new();
    while !rest.is_empty() {
        let after_space = rest.strip_prefix(' ')?;
        let (tok, tail) = quoted_token(after_space)?;
        extra.push(tok);
        rest = tail;
    }
    Some((first, extra))
}
