use crate::pipeline::{
    Generator, GeneratorError, PipelineConfig, PipelineOutcome, ValidationPipeline,
};
use crate::validate::ValidationOutcome;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::panic::{AssertUnwindSafe, catch_unwind};
use trail_toolchain_diagnostics::{Category, Diagnostic};
use trail_toolchain_spec_tables::SpecRegistry;

/// One regression fixture: a natural-language request and the expected verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fixture {
    /// Unique fixture name.
    pub name: String,
    /// Natural-language input handed to the generator.
    pub input: String,
    /// Canned generator output for stub runs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script: Option<String>,
    /// Whether the generated script is expected to validate cleanly.
    pub should_pass: bool,
    /// For failing fixtures, a category that must appear among the issues.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_error: Option<Category>,
}

impl Fixture {
    fn new(name: &str, input: &str, script: &str, expected_error: Option<Category>) -> Self {
        Self {
            name: name.to_string(),
            input: input.to_string(),
            script: Some(script.to_string()),
            should_pass: expected_error.is_none(),
            expected_error,
        }
    }
}

/// The built-in regression battery.
pub fn builtin_fixtures() -> Vec<Fixture> {
    vec![
        Fixture::new(
            "valid_cube_creation",
            "Create a 50mm cube",
            "~ Command `ProCmdDashboardActivate`\n~ Command `ProCmdModelNew`",
            None,
        ),
        Fixture::new(
            "invalid_syntax",
            "Create invalid command",
            "Command InvalidCommand",
            Some(Category::Syntax),
        ),
        Fixture::new(
            "unknown_command",
            "Fillet every edge",
            "~ Command `ProCmdDashboardActivate`\n~ Command `ProCmdFilletEverything`",
            Some(Category::Semantic),
        ),
        Fixture::new(
            "missing_context",
            "Extrude without sketch",
            "~ Command `ProCmdExtrudeDashboard`",
            Some(Category::Flow),
        ),
        Fixture::new(
            "invalid_parameters",
            "Create cube with size ABC",
            "~ Command `ProCmdDashboardActivate`\n\
             ~ Command `ProCmdModelNew`\n\
             ~ Command `ProCmdSketchNew`\n\
             ~ Command `ProCmdExtrudeDashboard`\n\
             ~ Input `ABC`\n\
             ~ Command `ProCmdDashboardAccept`",
            Some(Category::Parameter),
        ),
        Fixture::new(
            "extrude_sketch_profile",
            "Extrude the sketch 25mm",
            "! base feature\n\
             ~ Command `ProCmdDashboardActivate`\n\
             ~ Command `ProCmdModelNew`\n\
             ~ Command `ProCmdSketchNew`\n\
             ~ Command `ProCmdExtrudeDashboard`\n\
             ~ Input `25`\n\
             ~ Command `ProCmdDashboardAccept`\n\
             ~ Command `ProCmdSketchDone`",
            None,
        ),
    ]
}

/// Stub generator returning fixed scripts for known inputs.
#[derive(Debug, Clone, Default)]
pub struct CannedGenerator {
    scripts: HashMap<String, String>,
}

impl CannedGenerator {
    /// An empty generator; every input fails.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a script for an input (builder pattern).
    pub fn with(mut self, input: impl Into<String>, script: impl Into<String>) -> Self {
        self.scripts.insert(input.into(), script.into());
        self
    }

    /// A generator answering every fixture that carries a canned script.
    pub fn from_fixtures(fixtures: &[Fixture]) -> Self {
        let scripts = fixtures
            .iter()
            .filter_map(|f| f.script.as_ref().map(|s| (f.input.clone(), s.clone())))
            .collect();
        Self { scripts }
    }
}

impl Generator for CannedGenerator {
    fn generate(&self, nl_text: &str) -> Result<String, GeneratorError> {
        self.scripts
            .get(nl_text)
            .cloned()
            .ok_or_else(|| GeneratorError::new(format!("no canned script for input {nl_text:?}")))
    }
}

/// Result of running one fixture.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FixtureResult {
    /// Whether the verdict matched the expectation.
    pub passed: bool,
    /// The generated (and possibly corrected) script, when generation succeeded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated: Option<String>,
    /// Classification of the script, when generation succeeded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation_result: Option<ValidationOutcome>,
    /// Issues found in the script.
    pub issues: Vec<Diagnostic>,
    /// The fixture's expectation.
    pub expected_to_pass: bool,
    /// Whether the script validated cleanly.
    pub actually_passed: bool,
    /// Why the fixture could not be run, if it could not.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Aggregated fixture results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HarnessReport {
    /// Number of fixtures run.
    pub total_tests: usize,
    /// Fixtures whose verdict matched.
    pub passed: usize,
    /// Fixtures whose verdict did not match, or that could not run.
    pub failed: usize,
    /// Per-fixture results keyed by fixture name.
    pub details: BTreeMap<String, FixtureResult>,
}

impl HarnessReport {
    /// `true` if every fixture passed.
    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }
}

/// Errors raised while building a [`TestHarness`].
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    /// Two fixtures share a name, so their results would collide in the report.
    #[error("duplicate fixture name: {0}")]
    DuplicateFixture(String),
}

/// Runs a fixture battery through a generator and the validator.
///
/// Correction is disabled by default so fixtures see the generator's raw
/// output; pass a config to exercise the correction pass as well.
pub struct TestHarness<'r, G> {
    pipeline: ValidationPipeline<'r, G>,
    fixtures: Vec<Fixture>,
}

impl<'r, G: Generator> TestHarness<'r, G> {
    /// Create a harness over `fixtures`.
    ///
    /// Fails if two fixtures share a name.
    pub fn new(
        generator: G,
        registry: &'r SpecRegistry,
        fixtures: Vec<Fixture>,
    ) -> Result<Self, HarnessError> {
        let mut seen = HashSet::with_capacity(fixtures.len());
        for fixture in &fixtures {
            if !seen.insert(fixture.name.as_str()) {
                return Err(HarnessError::DuplicateFixture(fixture.name.clone()));
            }
        }
        Ok(Self {
            pipeline: ValidationPipeline::new(generator, registry)
                .with_config(PipelineConfig::without_correction()),
            fixtures,
        })
    }

    /// Replace the pipeline configuration (builder pattern).
    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.pipeline = self.pipeline.with_config(config);
        self
    }

    /// The fixtures this harness runs.
    pub fn fixtures(&self) -> &[Fixture] {
        &self.fixtures
    }

    /// Run every fixture. A fixture whose generator errors or panics is
    /// recorded as failed and does not stop the remaining fixtures.
    pub fn run(&self) -> HarnessReport {
        let mut details = BTreeMap::new();
        let mut passed = 0usize;
        for fixture in &self.fixtures {
            let result = self.run_fixture(fixture);
            tracing::debug!(fixture = %fixture.name, passed = result.passed, "fixture finished");
            if result.passed {
                passed += 1;
            }
            details.insert(fixture.name.clone(), result);
        }
        let total_tests = self.fixtures.len();
        HarnessReport {
            total_tests,
            passed,
            failed: total_tests - passed,
            details,
        }
    }

    fn run_fixture(&self, fixture: &Fixture) -> FixtureResult {
        let run = catch_unwind(AssertUnwindSafe(|| {
            self.pipeline.generate_and_validate(&fixture.input)
        }));
        let error = match run {
            Ok(Ok(outcome)) => return Self::judge(fixture, outcome),
            Ok(Err(err)) => match std::error::Error::source(&err) {
                Some(cause) => format!("{err}: {cause}"),
                None => err.to_string(),
            },
            Err(payload) => {
                let message = panic_payload_to_message(payload);
                tracing::warn!(fixture = %fixture.name, panic = %message, "generator panicked");
                format!("generator panicked: {message}")
            }
        };
        FixtureResult {
            passed: false,
            generated: None,
            validation_result: None,
            issues: Vec::new(),
            expected_to_pass: fixture.should_pass,
            actually_passed: false,
            error: Some(error),
        }
    }

    fn judge(fixture: &Fixture, outcome: PipelineOutcome) -> FixtureResult {
        let verdict_matches = outcome.is_valid == fixture.should_pass;
        let category_matches = match fixture.expected_error {
            Some(cat) if !fixture.should_pass => outcome.issues.iter().any(|d| d.category == cat),
            _ => true,
        };

        FixtureResult {
            passed: verdict_matches && category_matches,
            generated: Some(outcome.output),
            validation_result: Some(outcome.result),
            expected_to_pass: fixture.should_pass,
            actually_passed: outcome.is_valid,
            issues: outcome.issues,
            error: None,
        }
    }
}

fn panic_payload_to_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        return (*msg).to_string();
    }
    if let Some(msg) = payload.downcast_ref::<String>() {
        return msg.clone();
    }
    "unknown panic payload".to_string()
}
