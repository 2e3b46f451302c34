use super::ctx;
use crate::script::line::TrailLine;
use serde::Serialize;
use trail_toolchain_diagnostics::{Category, Diagnostic, codes};
use trail_toolchain_spec_tables::{BASE_CONTEXT, ContextTransition, SpecRegistry};

/// Stack of active context tags for one validation pass.
///
/// Starts as `["startup"]` and is never empty: the base tag cannot be popped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionContext {
    stack: Vec<String>,
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self::new()
    }
}

impl ExecutionContext {
    /// A fresh stack holding only the base context.
    pub fn new() -> Self {
        Self {
            stack: vec![BASE_CONTEXT.to_string()],
        }
    }

    /// Tags from bottom (base) to top.
    pub fn stack(&self) -> &[String] {
        &self.stack
    }

    /// The most recently pushed tag.
    pub fn top(&self) -> &str {
        // Invariant: the base tag is never removed.
        self.stack.last().map_or(BASE_CONTEXT, String::as_str)
    }

    /// Whether `tag` is anywhere on the stack.
    pub fn contains(&self, tag: &str) -> bool {
        self.stack.iter().any(|t| t == tag)
    }

    /// Whether at least one of `required` is active. An empty requirement
    /// is always satisfied.
    pub fn satisfies(&self, required: &[String]) -> bool {
        required.is_empty() || required.iter().any(|t| self.contains(t))
    }

    /// Push `tag` on top of the stack.
    pub fn push(&mut self, tag: &str) {
        self.stack.push(tag.to_string());
    }

    /// Remove the most recently pushed occurrence of `tag`.
    ///
    /// Returns `false` when the tag is absent or only present as the base.
    pub fn pop_tag(&mut self, tag: &str) -> bool {
        match self.stack.iter().rposition(|t| t == tag) {
            Some(pos) if pos > 0 => {
                self.stack.remove(pos);
                true
            }
            _ => false,
        }
    }

    /// Apply a declared transition: pop first, then push.
    pub fn apply(&mut self, transition: &ContextTransition) {
        if let Some(tag) = transition.pop.as_deref() {
            self.pop_tag(tag);
        }
        if let Some(tag) = transition.push.as_deref() {
            self.push(tag);
        }
    }
}

/// TRL3001: commands invoked while none of their required context tags are
/// active.
///
/// Unknown commands are skipped; they are reported by the semantic check.
/// Returns the context stack as it stands after the last line.
pub fn check_flow(
    lines: &[TrailLine<'_>],
    registry: &SpecRegistry,
    issues: &mut Vec<Diagnostic>,
) -> ExecutionContext {
    let mut context = ExecutionContext::new();
    for line in lines {
        let Some(name) = line.kind.command_name() else {
            continue;
        };
        let Some(spec) = registry.lookup(name) else {
            continue;
        };

        if !context.satisfies(&spec.context) {
            issues.push(
                Diagnostic::new(
                    codes::CONTEXT_VIOLATION,
                    Category::Flow,
                    line.line_number,
                    format!(
                        "Line {}: Command '{}' cannot be executed in context {:?}. Required: {:?}",
                        line.line_number,
                        name,
                        context.stack(),
                        spec.context
                    ),
                    Some(line.span),
                )
                .with_context(ctx!(
                    "command" => name,
                    "context" => context.stack().join(","),
                    "required" => spec.context.join("|"),
                )),
            );
        }

        if let Some(transition) = &spec.transition {
            context.apply(transition);
            tracing::trace!(
                line = line.line_number,
                command = name,
                top = context.top(),
                "context transition"
            );
        }
    }
    context
}
