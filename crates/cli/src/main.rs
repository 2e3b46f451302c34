mod render;

use std::fs;
use std::io::{self, Read};
use std::process;

use anyhow::{Context, Result, bail};
use ariadne::{Color, Fmt};
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use trail_toolchain_core::{
    CannedGenerator, SpecRegistry, TestHarness, Validator, builtin_fixtures, classify,
    correct_and_revalidate, to_pretty_json,
};
use trail_toolchain_diagnostics as diag;

use crate::render::{Format, print_json, print_summary, render_diagnostics_pretty};

// ── CLI definition ──────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "trail",
    version,
    about = "Trail toolchain: check, classify, and repair CAD trail command scripts"
)]
struct Cli {
    /// Output mode: "pretty" for coloured terminal output, "json" for
    /// machine-readable JSON. Defaults to "pretty" when stdout is a TTY,
    /// "json" otherwise.
    #[arg(long, global = true, value_parser = ["pretty", "json"])]
    output: Option<String>,

    /// Path to a command registry JSON table. Defaults to the built-in
    /// CAD command table.
    #[arg(long, global = true)]
    spec: Option<String>,

    /// Enable debug logging on stderr (overrides RUST_LOG).
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    // ── Script analysis ─────────────────────────────────────────────
    /// Validate a trail script. Use "-" to read from stdin.
    Check { file: String },

    /// Print the classified lines of a trail script as JSON.
    Classify { file: String },

    // ── Script transformation ───────────────────────────────────────
    /// Run one correction pass over a trail script and re-validate it.
    Fix {
        file: String,
        /// Write the corrected script back to the file (in-place).
        #[arg(long, short, conflicts_with = "check")]
        write: bool,
        /// Check whether the script needs correction (exit 1 if so). For CI.
        #[arg(long, conflicts_with = "write")]
        check: bool,
    },

    // ── Reference / informational ───────────────────────────────────
    /// List the commands in the registry.
    Commands,

    /// Explain a diagnostic ID (e.g. TRL3001).
    Explain { id: String },

    /// Run the built-in fixture battery against the registry.
    Selftest,
}

// ── Main ────────────────────────────────────────────────────────────────

fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("trail=debug,trail_toolchain_core=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr).with_target(false))
        .with(filter)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug);
    tracing::debug!(?cli, "trail starting");

    let format = Format::resolve_or_detect(cli.output.as_deref());

    match cli.cmd {
        Cmd::Check { file } => cmd_check(&file, cli.spec.as_deref(), format)?,
        Cmd::Classify { file } => cmd_classify(&file)?,
        Cmd::Fix { file, write, check } => {
            cmd_fix(&file, cli.spec.as_deref(), write, check, format)?
        }
        Cmd::Commands => cmd_commands(cli.spec.as_deref(), format)?,
        Cmd::Explain { id } => cmd_explain(&id, format)?,
        Cmd::Selftest => cmd_selftest(cli.spec.as_deref(), format)?,
    }

    Ok(())
}

// ── Commands ────────────────────────────────────────────────────────────

fn cmd_check(file: &str, spec_path: Option<&str>, format: Format) -> Result<()> {
    let input = read_input(file)?;
    let registry = load_registry(spec_path)?;
    let report = Validator::new(&registry).validate(&input);

    match format {
        Format::Json => {
            let out = serde_json::json!({
                "file": file,
                "result": report.result,
                "is_valid": report.is_valid(),
                "issues": report.issues,
            });
            print_json(&out)?;
        }
        Format::Pretty => {
            render_diagnostics_pretty(&input, display_name(file), &report.issues);
            print_summary(&report.issues);
            if report.is_valid() {
                eprintln!("{}: {}", "valid".fg(Color::Green), display_name(file));
            } else {
                eprintln!("{}: {}", report.result.fg(Color::Red), display_name(file));
            }
        }
    }

    if !report.is_valid() {
        process::exit(1);
    }
    Ok(())
}

fn cmd_classify(file: &str) -> Result<()> {
    let input = read_input(file)?;
    let lines = classify(&input);
    println!("{}", to_pretty_json(&lines));
    Ok(())
}

fn cmd_fix(
    file: &str,
    spec_path: Option<&str>,
    write: bool,
    check: bool,
    format: Format,
) -> Result<()> {
    if write && file == "-" {
        bail!("--write needs a file path; cannot write back to stdin");
    }
    let input = read_input(file)?;
    let registry = load_registry(spec_path)?;
    let result = correct_and_revalidate(&Validator::new(&registry), &input);

    if check {
        status_message(
            format,
            !result.corrected,
            "no correction needed",
            "needs correction",
            file,
        )?;
        if result.corrected {
            process::exit(1);
        }
        return Ok(());
    }

    if write {
        if result.corrected {
            fs::write(file, &result.output)
                .with_context(|| format!("failed to write corrected script to '{file}'"))?;
        }
        status_message(format, result.corrected, "corrected", "unchanged", file)?;
    } else {
        match format {
            Format::Json => print_json(&result)?,
            Format::Pretty => print!("{}", result.output),
        }
    }

    if format == Format::Pretty {
        render_diagnostics_pretty(&result.output, display_name(file), &result.report.issues);
        print_summary(&result.report.issues);
    }

    if !result.report.is_valid() {
        process::exit(1);
    }
    Ok(())
}

fn cmd_commands(spec_path: Option<&str>, format: Format) -> Result<()> {
    let registry = load_registry(spec_path)?;

    match format {
        Format::Json => print_json(&registry)?,
        Format::Pretty => {
            for cmd in registry.commands() {
                let marker = if cmd.required { "*" } else { " " };
                let context = if cmd.context.is_empty() {
                    "any".to_string()
                } else {
                    cmd.context.join("|")
                };
                let name = cmd.name.as_str().fg(Color::Cyan);
                let mut line = format!("{marker} {name} [{context}]");
                if !cmd.parameters.is_empty() {
                    line.push_str(&format!(" ({})", cmd.parameters.join(", ")));
                }
                if let Some(t) = &cmd.transition {
                    if let Some(pop) = &t.pop {
                        line.push_str(&format!(" -{pop}"));
                    }
                    if let Some(push) = &t.push {
                        line.push_str(&format!(" +{push}"));
                    }
                }
                println!("{line}");
            }
            eprintln!(
                "{} commands, {} required (format {}), * = required",
                registry.len(),
                registry.required_commands().count(),
                registry.format_version()
            );
        }
    }
    Ok(())
}

fn cmd_explain(id: &str, format: Format) -> Result<()> {
    match format {
        Format::Json => {
            let out = serde_json::json!({
                "id": id,
                "explanation": diag::explain(id),
            });
            print_json(&out)?;
        }
        Format::Pretty => {
            if let Some(text) = diag::explain(id) {
                println!("{}: {}", id.fg(Color::Cyan), text);
            } else {
                println!("{}: (no explanation available)", id);
            }
        }
    }
    Ok(())
}

fn cmd_selftest(spec_path: Option<&str>, format: Format) -> Result<()> {
    let registry = load_registry(spec_path)?;
    let fixtures = builtin_fixtures();
    let generator = CannedGenerator::from_fixtures(&fixtures);
    let report = TestHarness::new(generator, &registry, fixtures)
        .context("invalid fixture battery")?
        .run();

    match format {
        Format::Json => print_json(&report)?,
        Format::Pretty => {
            for (name, result) in &report.details {
                let status = if result.passed {
                    format!("{}", "PASS".fg(Color::Green))
                } else {
                    format!("{}", "FAIL".fg(Color::Red))
                };
                match (&result.validation_result, &result.error) {
                    (_, Some(err)) => println!("{status} {name}: {err}"),
                    (Some(outcome), None) => println!("{status} {name}: {outcome}"),
                    (None, None) => println!("{status} {name}"),
                }
            }
            eprintln!(
                "{} passed, {} failed, {} total",
                report.passed, report.failed, report.total_tests
            );
        }
    }

    if !report.all_passed() {
        process::exit(1);
    }
    Ok(())
}

// ── Helpers ─────────────────────────────────────────────────────────────

/// Read a script from a file, or from stdin when `file` is `-`.
fn read_input(file: &str) -> Result<String> {
    if file == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read script from stdin")?;
        return Ok(buf);
    }
    fs::read_to_string(file).with_context(|| format!("failed to read script '{file}'"))
}

fn display_name(file: &str) -> &str {
    if file == "-" { "<stdin>" } else { file }
}

/// Load the registry from `--spec`, or fall back to the built-in table.
fn load_registry(spec_path: Option<&str>) -> Result<SpecRegistry> {
    let Some(path) = spec_path else {
        return Ok(SpecRegistry::builtin());
    };
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read registry table '{path}'"))?;
    let registry = SpecRegistry::from_json(&json)
        .with_context(|| format!("failed to load registry table '{path}'"))?;
    tracing::debug!(path, commands = registry.len(), "loaded registry table");
    Ok(registry)
}

/// Emit a status message for `fix --check` / `fix --write`.
fn status_message(
    format: Format,
    condition: bool,
    if_true: &str,
    if_false: &str,
    file: &str,
) -> Result<()> {
    let msg = if condition { if_true } else { if_false };
    match format {
        Format::Json => print_json(&serde_json::json!({ "status": msg, "file": file }))?,
        Format::Pretty => eprintln!("{}: {}", msg, display_name(file)),
    }
    Ok(())
}
