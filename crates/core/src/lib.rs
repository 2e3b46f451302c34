//! Trail toolchain core library.
//!
//! Classifies, validates, and repairs CAD trail command scripts before they
//! are replayed against the host application. The main entry points are
//! [`classify`] for line classification, [`Validator::validate`] for the
//! four-stage check, [`attempt_correction`] for the single repair pass, and
//! [`ValidationPipeline::generate_and_validate`] for the generator-facing
//! integration shell.

#![warn(missing_docs)]

/// Single-pass syntax repair of flagged lines.
pub mod correct;
/// Fixture battery for regression-testing generator output.
pub mod harness;
/// Generator → validator → correction composition.
pub mod pipeline;
/// Trail script model and line classifier.
pub mod script;
/// Four-stage validation of classified scripts against a command registry.
pub mod validate;

// ── Convenience re-exports ──────────────────────────────────────────────────

// Script model
pub use script::classifier::classify;
pub use script::line::{LineKind, TrailLine};

// Diagnostics (re-exported from the diagnostics crate)
pub use trail_toolchain_diagnostics::{Category, Diagnostic, Span, codes};

// Registry (re-exported from the spec-tables crate)
pub use trail_toolchain_spec_tables::{CommandSpec, RegistryError, SpecRegistry};

// Validator
pub use validate::{ValidationOutcome, ValidationReport, Validator, validate};

// Correction
pub use correct::{CorrectionResult, attempt_correction, correct_and_revalidate};

// Pipeline
pub use pipeline::{
    Generator, GeneratorError, PipelineConfig, PipelineError, PipelineOutcome, ValidationPipeline,
};

// Harness
pub use harness::{
    CannedGenerator, Fixture, HarnessError, HarnessReport, TestHarness, builtin_fixtures,
};

// Serialization helpers
pub use script::dump::to_pretty_json;
