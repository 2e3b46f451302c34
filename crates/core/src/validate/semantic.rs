use super::ctx;
use crate::script::line::TrailLine;
use trail_toolchain_diagnostics::{Category, Diagnostic, codes};
use trail_toolchain_spec_tables::SpecRegistry;

/// TRL2001: `~ Command` lines naming a command the registry does not know.
///
/// Activation, input, and comment lines are not part of the known-command
/// contract and are never checked here.
pub fn check_semantics(
    lines: &[TrailLine<'_>],
    registry: &SpecRegistry,
    issues: &mut Vec<Diagnostic>,
) {
    for line in lines {
        let Some(name) = line.kind.command_name() else {
            continue;
        };
        if registry.is_known(name) {
            continue;
        }
        issues.push(
            Diagnostic::new(
                codes::UNKNOWN_COMMAND,
                Category::Semantic,
                line.line_number,
                format!(
                    "Line {}: semantic error: unknown command '{}'",
                    line.line_number, name
                ),
                Some(line.span),
            )
            .with_context(ctx!("command" => name)),
        );
    }
}
