use crate::script::classifier::classify;
use crate::script::line::TrailLine;
use serde::{Deserialize, Serialize};
use trail_toolchain_diagnostics::{Category, Diagnostic};
use trail_toolchain_spec_tables::SpecRegistry;

mod flow;
mod params;
mod semantic;
mod syntax;

pub use flow::{ExecutionContext, check_flow};
pub use params::check_parameters;
pub use semantic::check_semantics;
pub use syntax::check_syntax;

/// Shorthand for building a `BTreeMap<String, String>` context from key-value pairs.
///
/// ```ignore
/// ctx!("command" => name, "value" => val)
/// ```
macro_rules! ctx {
    ($($k:expr => $v:expr),+ $(,)?) => {
        std::collections::BTreeMap::from([$(($k.into(), $v.into())),+])
    };
}
pub(crate) use ctx;

/// Overall classification of a validated script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationOutcome {
    /// No issues.
    Valid,
    /// At least one line has an unrecognized shape.
    SyntaxError,
    /// No syntax issues, but at least one unknown command.
    SemanticError,
    /// Only flow and/or parameter issues.
    ExecutionError,
}

impl ValidationOutcome {
    /// Classify an issue list by priority: syntax, then semantic, then
    /// everything else as an execution error.
    pub fn from_issues(issues: &[Diagnostic]) -> Self {
        let has = |cat: Category| issues.iter().any(|d| d.category == cat);
        if issues.is_empty() {
            ValidationOutcome::Valid
        } else if has(Category::Syntax) {
            ValidationOutcome::SyntaxError
        } else if has(Category::Semantic) {
            ValidationOutcome::SemanticError
        } else {
            ValidationOutcome::ExecutionError
        }
    }
}

impl std::fmt::Display for ValidationOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationOutcome::Valid => write!(f, "valid"),
            ValidationOutcome::SyntaxError => write!(f, "syntax_error"),
            ValidationOutcome::SemanticError => write!(f, "semantic_error"),
            ValidationOutcome::ExecutionError => write!(f, "execution_error"),
        }
    }
}

/// Result of validating one trail script.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    /// Overall classification. `Valid` exactly when `issues` is empty.
    pub result: ValidationOutcome,
    /// All issues, in checker order: syntax, semantic, flow, parameter.
    pub issues: Vec<Diagnostic>,
}

impl ValidationReport {
    /// Build a report from issues already in checker order.
    pub fn from_issues(issues: Vec<Diagnostic>) -> Self {
        Self {
            result: ValidationOutcome::from_issues(&issues),
            issues,
        }
    }

    /// `true` if the script has no issues.
    pub fn is_valid(&self) -> bool {
        self.result == ValidationOutcome::Valid
    }

    /// Issues of the given category, in report order.
    pub fn issues_in(&self, category: Category) -> impl Iterator<Item = &Diagnostic> {
        self.issues.iter().filter(move |d| d.category == category)
    }
}

/// Runs the four checkers over a script against a shared registry.
///
/// Holds no per-script state, so one validator can check any number of
/// scripts, from any number of threads.
#[derive(Debug, Clone, Copy)]
pub struct Validator<'r> {
    registry: &'r SpecRegistry,
}

impl<'r> Validator<'r> {
    /// Create a validator backed by `registry`.
    pub fn new(registry: &'r SpecRegistry) -> Self {
        Self { registry }
    }

    /// The registry this validator checks against.
    pub fn registry(&self) -> &'r SpecRegistry {
        self.registry
    }

    /// Classify and validate a script.
    pub fn validate(&self, script: &str) -> ValidationReport {
        let lines = classify(script);
        self.validate_lines(&lines)
    }

    /// Validate an already-classified script.
    pub fn validate_lines(&self, lines: &[TrailLine<'_>]) -> ValidationReport {
        let mut issues = Vec::new();
        check_syntax(lines, &mut issues);
        let after_syntax = issues.len();
        check_semantics(lines, self.registry, &mut issues);
        let after_semantic = issues.len();
        check_flow(lines, self.registry, &mut issues);
        let after_flow = issues.len();
        check_parameters(lines, self.registry, &mut issues);

        tracing::debug!(
            lines = lines.len(),
            syntax = after_syntax,
            semantic = after_semantic - after_syntax,
            flow = after_flow - after_semantic,
            parameter = issues.len() - after_flow,
            "validated trail script"
        );

        ValidationReport::from_issues(issues)
    }
}

/// Validate a script against `registry`.
pub fn validate(script: &str, registry: &SpecRegistry) -> ValidationReport {
    Validator::new(registry).validate(script)
}
