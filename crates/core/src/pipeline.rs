use crate::correct::correct_and_revalidate;
use crate::validate::{ValidationOutcome, Validator};
use serde::Serialize;
use trail_toolchain_diagnostics::Diagnostic;
use trail_toolchain_spec_tables::SpecRegistry;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failure reported by a [`Generator`].
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct GeneratorError {
    message: String,
    #[source]
    source: Option<BoxError>,
}

impl GeneratorError {
    /// A generator failure with no underlying cause.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// A generator failure wrapping an underlying error (I/O, model runtime).
    pub fn with_source(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }
}

/// Natural-language → trail script generator.
///
/// Output may be non-deterministic; every call is validated independently.
pub trait Generator {
    /// Produce a trail script for `nl_text`.
    fn generate(&self, nl_text: &str) -> Result<String, GeneratorError>;
}

impl<F> Generator for F
where
    F: Fn(&str) -> Result<String, GeneratorError>,
{
    fn generate(&self, nl_text: &str) -> Result<String, GeneratorError> {
        self(nl_text)
    }
}

/// Errors surfaced by [`ValidationPipeline::generate_and_validate`].
///
/// Invalid scripts are not errors; they are reported in [`PipelineOutcome`].
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The generator failed to produce a script.
    #[error("generation failed for input {input:?}")]
    Generation {
        /// The natural-language input that was being generated.
        input: String,
        /// The generator's error.
        #[source]
        source: GeneratorError,
    },
}

/// Pipeline behavior settings.
#[non_exhaustive]
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Run one correction pass (and one re-validation) on invalid scripts.
    pub correct_on_failure: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            correct_on_failure: true,
        }
    }
}

impl PipelineConfig {
    /// Disable the correction pass.
    pub fn without_correction() -> Self {
        Self {
            correct_on_failure: false,
        }
    }
}

/// Final state of one `generate_and_validate` call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineOutcome {
    /// The natural-language input.
    pub input: String,
    /// The script that was finally validated (corrected if a correction applied).
    pub output: String,
    /// Classification of `output`.
    pub result: ValidationOutcome,
    /// Issues found in `output`.
    pub issues: Vec<Diagnostic>,
    /// `true` exactly when `result` is `Valid`.
    pub is_valid: bool,
    /// Whether `output` differs from the generated script.
    pub corrected: bool,
}

/// Generator, validator, and correction engine composed into one call.
pub struct ValidationPipeline<'r, G> {
    generator: G,
    validator: Validator<'r>,
    config: PipelineConfig,
}

impl<'r, G: Generator> ValidationPipeline<'r, G> {
    /// Create a pipeline with the default configuration.
    pub fn new(generator: G, registry: &'r SpecRegistry) -> Self {
        Self {
            generator,
            validator: Validator::new(registry),
            config: PipelineConfig::default(),
        }
    }

    /// Replace the configuration (builder pattern).
    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// Generate a script for `nl_text`, validate it, and, if it is invalid,
    /// attempt one correction and re-validate once.
    pub fn generate_and_validate(&self, nl_text: &str) -> Result<PipelineOutcome, PipelineError> {
        let script = self.generator.generate(nl_text).map_err(|source| {
            tracing::warn!(input = nl_text, error = %source, "generator failed");
            PipelineError::Generation {
                input: nl_text.to_string(),
                source,
            }
        })?;
        Ok(self.check_script(nl_text, &script))
    }

    /// Validate an already-generated script as if the generator had produced it.
    pub fn check_script(&self, nl_text: &str, script: &str) -> PipelineOutcome {
        let (output, report, corrected) = if self.config.correct_on_failure {
            let r = correct_and_revalidate(&self.validator, script);
            (r.output, r.report, r.corrected)
        } else {
            (script.to_string(), self.validator.validate(script), false)
        };

        tracing::info!(
            result = %report.result,
            issues = report.issues.len(),
            corrected,
            "pipeline outcome"
        );

        PipelineOutcome {
            input: nl_text.to_string(),
            output,
            is_valid: report.is_valid(),
            result: report.result,
            issues: report.issues,
            corrected,
        }
    }
}
