use super::ctx;
use crate::script::line::{LineKind, TrailLine};
use trail_toolchain_diagnostics::{Category, Diagnostic, Span, codes};
use trail_toolchain_spec_tables::{CommandSpec, ParamRange, ParamType, SpecRegistry};

/// The command whose declared parameters the next `~ Input` lines fill.
struct PendingInput<'r> {
    spec: &'r CommandSpec,
    next_param: usize,
}

/// TRL4001/TRL4002: input values that fail their parameter's type or range.
///
/// Each `~ Command` or `~ Activate` line sets the pending input target to
/// the named command (cleared when the name is not in the registry). Every
/// following `~ Input` line binds its primary value to the pending command's
/// next unbound parameter; inputs beyond the declared parameters, or with no
/// pending command, are not checked.
pub fn check_parameters(
    lines: &[TrailLine<'_>],
    registry: &SpecRegistry,
    issues: &mut Vec<Diagnostic>,
) {
    let mut pending: Option<PendingInput<'_>> = None;
    for line in lines {
        match &line.kind {
            LineKind::CommandInvocation { name } | LineKind::Activate { name } => {
                pending = registry.lookup(name).map(|spec| PendingInput {
                    spec,
                    next_param: 0,
                });
            }
            LineKind::Input { value, .. } => {
                let Some(target) = pending.as_mut() else {
                    continue;
                };
                let spec = target.spec;
                let Some(param) = spec.parameters.get(target.next_param) else {
                    continue;
                };
                target.next_param += 1;
                let site = InputSite {
                    line_number: line.line_number,
                    span: line.span,
                    command: &spec.name,
                    param,
                };
                check_value(&site, value, spec, issues);
            }
            LineKind::Comment | LineKind::Blank | LineKind::Invalid => {}
        }
    }
}

struct InputSite<'a> {
    line_number: usize,
    span: Span,
    command: &'a str,
    param: &'a str,
}

fn check_value(
    site: &InputSite<'_>,
    value: &str,
    spec: &CommandSpec,
    issues: &mut Vec<Diagnostic>,
) {
    if spec.parameter_type(site.param) != Some(ParamType::Numeric) {
        return;
    }
    let Some(n) = parse_numeric(value) else {
        issues.push(
            Diagnostic::new(
                codes::EXPECTED_NUMERIC,
                Category::Parameter,
                site.line_number,
                format!(
                    "Line {}: Expected numeric value for {}.{}, got '{}'",
                    site.line_number, site.command, site.param, value
                ),
                Some(site.span),
            )
            .with_context(ctx!(
                "command" => site.command,
                "param" => site.param,
                "value" => value,
            )),
        );
        return;
    };

    if let Some(range) = spec.range(site.param)
        && !range.contains(n)
    {
        issues.push(
            Diagnostic::new(
                codes::OUT_OF_RANGE,
                Category::Parameter,
                site.line_number,
                format!(
                    "Line {}: Value {} for {}.{} out of range {}",
                    site.line_number,
                    value,
                    site.command,
                    site.param,
                    describe_range(range)
                ),
                Some(site.span),
            )
            .with_context(ctx!(
                "command" => site.command,
                "param" => site.param,
                "value" => value,
                "range" => describe_range(range),
            )),
        );
    }
}

/// Parse a numeric input. Infinity and NaN spellings are not numeric; a
/// finite literal too large for `f64` parses to an infinity and is left to
/// the range check.
fn parse_numeric(value: &str) -> Option<f64> {
    let text = value.trim();
    let n = text.parse::<f64>().ok()?;
    if n.is_finite() {
        return Some(n);
    }
    let lower = text.to_ascii_lowercase();
    if lower.contains("inf") || lower.contains("nan") {
        None
    } else {
        Some(n)
    }
}

fn describe_range(range: &ParamRange) -> String {
    match (range.min, range.max) {
        (Some(lo), Some(hi)) => format!("[{},{}]", trim_f64(lo), trim_f64(hi)),
        (Some(lo), None) => format!(">= {}", trim_f64(lo)),
        (None, Some(hi)) => format!("<= {}", trim_f64(hi)),
        (None, None) => "(unbounded)".to_string(),
    }
}

fn trim_f64(n: f64) -> String {
    let s = format!("{:.6}", n);
    let s = s.trim_end_matches('0').trim_end_matches('.').to_string();
    if s.is_empty() { "0".to_string() } else { s }
}
