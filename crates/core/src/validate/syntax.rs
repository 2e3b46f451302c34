use super::ctx;
use crate::script::line::{LineKind, TrailLine};
use trail_toolchain_diagnostics::{Category, Diagnostic, codes};

/// TRL1001: one issue per line whose shape is not recognized.
pub fn check_syntax(lines: &[TrailLine<'_>], issues: &mut Vec<Diagnostic>) {
    for line in lines {
        if !matches!(line.kind, LineKind::Invalid) {
            continue;
        }
        tracing::trace!(line = line.line_number, text = line.text, "invalid line shape");
        issues.push(
            Diagnostic::new(
                codes::INVALID_SYNTAX,
                Category::Syntax,
                line.line_number,
                format!(
                    "Line {}: Invalid syntax format: {}",
                    line.line_number, line.text
                ),
                Some(line.span),
            )
            .with_context(ctx!("line" => line.text)),
        );
    }
}
