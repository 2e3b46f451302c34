//! Diagnostics for the trail toolchain.
//!
//! Provides [`Diagnostic`], [`Category`], and [`Span`] types used to report
//! defects found in trail scripts by the classifier and the validation
//! checkers. Diagnostic codes are defined in the [`codes`] module.

#![warn(missing_docs)]

/// Diagnostic ID constants.
pub mod codes;

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;

/// Which validation stage produced a diagnostic.
///
/// Variants are declared in the order the checkers run, which is also the
/// order issues appear in a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// The line does not match any recognized line shape.
    Syntax,
    /// The line names a command the registry does not know.
    Semantic,
    /// The command was issued outside its required execution context.
    Flow,
    /// An input value fails its parameter's type or range constraint.
    Parameter,
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::Syntax => write!(f, "syntax"),
            Category::Semantic => write!(f, "semantic"),
            Category::Flow => write!(f, "flow"),
            Category::Parameter => write!(f, "parameter"),
        }
    }
}

/// Byte span in the source input.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Span {
    /// Byte offset of the first character (0-based).
    pub start: usize,
    /// Byte offset one past the last character.
    pub end: usize,
}

impl Span {
    /// Create a span covering `[start, end)`.
    ///
    /// Panics if `end < start`.
    pub fn new(start: usize, end: usize) -> Self {
        assert!(end >= start, "Span end ({end}) < start ({start})");
        Self { start, end }
    }
}

/// A single issue found in a trail script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Unique diagnostic code (e.g., `"TRL1001"`).
    pub id: Cow<'static, str>,
    /// Validation stage that produced this diagnostic.
    pub category: Category,
    /// 1-based line number in the original script.
    pub line_number: usize,
    /// Human-readable diagnostic message.
    pub message: String,
    /// Optional byte span of the offending line in the source input.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,
    /// Machine-readable context for tooling. Keys and values are free-form strings.
    ///
    /// Uses `BTreeMap` for deterministic key ordering in serialized output.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<BTreeMap<String, String>>,
}

impl Diagnostic {
    /// Create a diagnostic with the given fields.
    pub fn new(
        id: impl Into<Cow<'static, str>>,
        category: Category,
        line_number: usize,
        message: impl Into<String>,
        span: Option<Span>,
    ) -> Self {
        Self {
            id: id.into(),
            category,
            line_number,
            message: message.into(),
            span,
            context: None,
        }
    }

    /// Attach machine-readable context metadata (builder pattern).
    ///
    /// Keys are short descriptors like `"command"`, `"value"`, `"required"`.
    pub fn with_context(mut self, ctx: BTreeMap<String, String>) -> Self {
        self.context = Some(ctx);
        self
    }

    /// Returns the human-readable explanation for this diagnostic's code, if available.
    pub fn explain(&self) -> Option<&'static str> {
        explain(&self.id)
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}[{}]: {}", self.category, self.id, self.message)
    }
}

/// Returns the human-readable explanation for a diagnostic code, if known.
pub fn explain(id: &str) -> Option<&'static str> {
    codes::explain_code(id)
}
