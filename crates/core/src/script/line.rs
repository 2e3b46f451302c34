use serde::Serialize;
use trail_toolchain_diagnostics::Span;

/// One line of a trail script after classification.
///
/// Every line borrows its text directly from the source input, so a
/// classified script is valid for as long as the input is alive.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrailLine<'a> {
    /// 1-based line number, counting blank and comment lines.
    pub line_number: usize,
    /// The line as written, without its line terminator.
    pub raw_text: &'a str,
    /// The line with surrounding whitespace trimmed.
    pub text: &'a str,
    /// Byte span of `text` in the source input.
    pub span: Span,
    /// Shape of the line.
    #[serde(flatten)]
    pub kind: LineKind<'a>,
}

/// Recognized line shapes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LineKind<'a> {
    /// `` ~ Command `name` ``
    CommandInvocation {
        /// Command name between the backticks.
        name: &'a str,
    },
    /// `` ~ Activate `name` ``
    Activate {
        /// Activated element name between the backticks.
        name: &'a str,
    },
    /// `` ~ Input `value` `extra`... ``
    Input {
        /// First backtick-quoted token.
        value: &'a str,
        /// Remaining backtick-quoted tokens, in order.
        extra_args: Vec<&'a str>,
    },
    /// A line starting with `!`.
    Comment,
    /// An empty or whitespace-only line.
    Blank,
    /// A line matching no recognized shape.
    Invalid,
}

impl<'a> LineKind<'a> {
    /// Command name if this is a `~ Command` line.
    pub fn command_name(&self) -> Option<&'a str> {
        match self {
            LineKind::CommandInvocation { name } => Some(*name),
            _ => None,
        }
    }
}
