//! Pretty diagnostic rendering using ariadne.
//!
//! Converts the toolchain's [`Diagnostic`] type into ariadne [`Report`]s for
//! coloured, source-annotated terminal output. Falls back to structured JSON
//! when the output is piped or when the user explicitly requests it.

use std::io::{self, IsTerminal};

use ariadne::{Color, Config, Fmt, IndexType, Label, Report, ReportKind, Source};
use trail_toolchain_diagnostics::{Category, Diagnostic};

// ── Output format ───────────────────────────────────────────────────────

/// Output format for reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Format {
    /// Coloured, source-annotated output (ariadne).
    Pretty,
    /// Machine-readable JSON.
    Json,
}

impl Format {
    /// Use the explicit choice, else pretty for a TTY and JSON for a pipe.
    pub(crate) fn resolve_or_detect(explicit: Option<&str>) -> Self {
        match explicit {
            Some("json") => Format::Json,
            Some("pretty") => Format::Pretty,
            _ => {
                if io::stdout().is_terminal() {
                    Format::Pretty
                } else {
                    Format::Json
                }
            }
        }
    }
}

// ── Category mapping ────────────────────────────────────────────────────

pub(crate) fn category_color(category: Category) -> Color {
    match category {
        Category::Syntax => Color::Red,
        Category::Semantic => Color::Magenta,
        Category::Flow => Color::Yellow,
        Category::Parameter => Color::Cyan,
    }
}

fn context_note(diag: &Diagnostic) -> Option<String> {
    let ctx = diag.context.as_ref()?;
    if ctx.is_empty() {
        return None;
    }
    Some(
        ctx.iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(", "),
    )
}

// ── Pretty rendering ────────────────────────────────────────────────────

/// Render diagnostics in pretty (ariadne) format to stderr.
///
/// Diagnostics with a span are rendered against the source line; those
/// without one are printed as standalone messages.
pub(crate) fn render_diagnostics_pretty(source: &str, filename: &str, diagnostics: &[Diagnostic]) {
    if diagnostics.is_empty() {
        return;
    }

    let config = Config::default()
        .with_compact(false)
        .with_index_type(IndexType::Byte);
    let mut cache = (filename, Source::from(source));

    for diag in diagnostics {
        let Some(span) = &diag.span else {
            eprintln!("{}[{}]: {}", diag.category, diag.id, diag.message);
            if let Some(note) = context_note(diag) {
                eprintln!("  = note: {note}");
            }
            if let Some(explanation) = diag.explain() {
                eprintln!("  = help: {explanation}");
            }
            continue;
        };

        // Clamp to the source so truncated input cannot panic the renderer.
        let start = span.start.min(source.len());
        let end = span.end.min(source.len()).max(start);

        let label_msg = context_note(diag).unwrap_or_else(|| diag.category.to_string());
        let mut builder = Report::build(ReportKind::Error, (filename, start..end))
            .with_code(diag.id.as_ref())
            .with_message(&diag.message)
            .with_config(config)
            .with_label(
                Label::new((filename, start..end))
                    .with_message(label_msg)
                    .with_color(category_color(diag.category)),
            );

        if let Some(explanation) = diag.explain() {
            builder = builder.with_help(explanation);
        }

        builder.finish().eprint(&mut cache).ok();
    }
}

// ── JSON rendering ──────────────────────────────────────────────────────

/// Print any serializable value as pretty JSON to stdout.
pub(crate) fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// ── Summary line ────────────────────────────────────────────────────────

/// Print a coloured summary line with per-category counts.
///
/// Example: `3 issues: 1 syntax, 2 flow`
pub(crate) fn print_summary(diagnostics: &[Diagnostic]) {
    if diagnostics.is_empty() {
        return;
    }

    let parts: Vec<String> = [
        Category::Syntax,
        Category::Semantic,
        Category::Flow,
        Category::Parameter,
    ]
    .into_iter()
    .filter_map(|cat| {
        let n = diagnostics.iter().filter(|d| d.category == cat).count();
        (n > 0).then(|| format!("{}", format!("{n} {cat}").fg(category_color(cat))))
    })
    .collect();

    let total = diagnostics.len();
    let s = if total == 1 { "" } else { "s" };
    eprintln!("{total} issue{s}: {}", parts.join(", "));
}
