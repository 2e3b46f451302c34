//! Validator tests: the four checkers, report classification, and ordering.

mod common;

use common::{EXTRUDE_PREAMBLE, REGISTRY, find_diag, of_category};
use trail_toolchain_core::validate::{ExecutionContext, check_flow};
use trail_toolchain_core::{
    Category, CommandSpec, SpecRegistry, ValidationOutcome, Validator, classify, codes, validate,
};
use trail_toolchain_spec_tables::{ContextTransition, ParamRange, ParamType};

// ─── Classification ──────────────────────────────────────────────────────────

#[test]
fn activate_then_model_new_is_valid() {
    let report = validate(
        "~ Command `ProCmdDashboardActivate`\n~ Command `ProCmdModelNew`",
        &REGISTRY,
    );
    assert_eq!(report.result, ValidationOutcome::Valid);
    assert!(report.issues.is_empty());
    assert!(report.is_valid());
}

#[test]
fn full_extrude_flow_is_valid() {
    let script = format!(
        "! base\n{EXTRUDE_PREAMBLE}~ Input `25`\n~ Command `ProCmdDashboardAccept`\n\
         ~ Command `ProCmdSketchDone`\n~ Command `ProCmdModelSave`\n"
    );
    let report = validate(&script, &REGISTRY);
    assert!(report.is_valid(), "unexpected issues: {:?}", report.issues);
}

#[test]
fn missing_marker_is_one_syntax_issue() {
    let report = validate("Command InvalidFormat", &REGISTRY);
    assert_eq!(report.result, ValidationOutcome::SyntaxError);
    assert_eq!(report.issues.len(), 1);
    let issue = &report.issues[0];
    assert_eq!(issue.category, Category::Syntax);
    assert_eq!(issue.id, codes::INVALID_SYNTAX);
    assert_eq!(issue.line_number, 1);
    assert!(issue.message.contains("Invalid syntax format"));
    assert!(issue.message.contains("Command InvalidFormat"));
}

#[test]
fn each_invalid_line_reports_its_own_number() {
    let report = validate(
        "~ Command `ProCmdDashboardActivate`\nbad one\n\nbad two\n! fine",
        &REGISTRY,
    );
    let lines: Vec<usize> = of_category(&report.issues, Category::Syntax)
        .iter()
        .map(|d| d.line_number)
        .collect();
    assert_eq!(lines, [2, 4]);
    assert_eq!(report.issues.len(), 2);
}

#[test]
fn unknown_command_is_semantic_error() {
    let report = validate("~ Command `UnknownCmd`", &REGISTRY);
    assert_eq!(report.result, ValidationOutcome::SemanticError);
    assert_eq!(report.issues.len(), 1);
    let issue = &report.issues[0];
    assert_eq!(issue.category, Category::Semantic);
    assert_eq!(issue.id, codes::UNKNOWN_COMMAND);
    assert!(issue.message.contains("UnknownCmd"));
    assert!(issue.message.contains("semantic"));
    assert!(issue.message.contains("Line 1"));
}

#[test]
fn activate_and_input_names_are_not_semantically_checked() {
    let report = validate("~ Activate `some_widget`\n~ Input `anything`", &REGISTRY);
    assert!(report.is_valid(), "unexpected issues: {:?}", report.issues);
}

#[test]
fn syntax_outranks_semantic_and_execution() {
    let script = "~ Command `ProCmdExtrudeDashboard`\n~ Input `x`\nbad line\n~ Command `Nope`";
    let report = validate(script, &REGISTRY);
    assert_eq!(report.result, ValidationOutcome::SyntaxError);

    let order: Vec<(Category, usize)> = report
        .issues
        .iter()
        .map(|d| (d.category, d.line_number))
        .collect();
    assert_eq!(
        order,
        [
            (Category::Syntax, 3),
            (Category::Semantic, 4),
            (Category::Flow, 1),
            (Category::Parameter, 2),
        ]
    );
}

#[test]
fn semantic_outranks_execution() {
    let report = validate(
        "~ Command `ProCmdExtrudeDashboard`\n~ Command `Nope`",
        &REGISTRY,
    );
    assert_eq!(report.result, ValidationOutcome::SemanticError);
    assert_eq!(report.issues_in(Category::Flow).count(), 1);
}

#[test]
fn validation_is_repeatable() {
    let script = "~ Command `ProCmdExtrudeDashboard`\n~ Input `ABC`\nbad";
    let validator = Validator::new(&REGISTRY);
    let first = validator.validate(script);
    let second = validator.validate(script);
    assert_eq!(first, second);
}

#[test]
fn outcome_serializes_snake_case() {
    let report = validate("~ Command `UnknownCmd`", &REGISTRY);
    let json = serde_json::to_value(&report).expect("serialize");
    assert_eq!(json["result"], "semantic_error");
    assert_eq!(json["issues"][0]["category"], "semantic");
    assert_eq!(json["issues"][0]["line_number"], 1);
}

// ─── Flow ────────────────────────────────────────────────────────────────────

#[test]
fn extrude_first_is_execution_error_citing_context() {
    let report = validate("~ Command `ProCmdExtrudeDashboard`", &REGISTRY);
    assert_eq!(report.result, ValidationOutcome::ExecutionError);
    assert_eq!(report.issues.len(), 1);
    let issue = &report.issues[0];
    assert_eq!(issue.category, Category::Flow);
    assert_eq!(issue.id, codes::CONTEXT_VIOLATION);
    assert!(issue.message.contains("ProCmdExtrudeDashboard"));
    assert!(issue.message.contains(r#"["startup"]"#), "{}", issue.message);
    assert!(issue.message.contains("sketch_active"), "{}", issue.message);
    let ctx = issue.context.as_ref().expect("flow issues carry context");
    assert_eq!(ctx["context"], "startup");
    assert_eq!(ctx["required"], "sketch_active");
}

#[test]
fn context_requirement_matches_anywhere_in_stack() {
    // ModelSave needs `modeling`, which is below `sketch_active`.
    let report = validate(
        "~ Command `ProCmdDashboardActivate`\n~ Command `ProCmdModelNew`\n\
         ~ Command `ProCmdSketchNew`\n~ Command `ProCmdModelSave`",
        &REGISTRY,
    );
    assert!(report.is_valid(), "unexpected issues: {:?}", report.issues);
}

#[test]
fn accept_pops_operation_pending() {
    let script = format!(
        "{EXTRUDE_PREAMBLE}~ Command `ProCmdDashboardAccept`\n~ Command `ProCmdDashboardAccept`"
    );
    let report = validate(&script, &REGISTRY);
    let flow = of_category(&report.issues, Category::Flow);
    assert_eq!(flow.len(), 1);
    assert_eq!(flow[0].line_number, 6);
}

#[test]
fn unknown_commands_do_not_touch_the_stack() {
    let lines = classify("~ Command `Nope`\n~ Command `ProCmdDashboardActivate`");
    let mut issues = Vec::new();
    let ctx = check_flow(&lines, &REGISTRY, &mut issues);
    assert!(issues.is_empty());
    assert_eq!(ctx.stack(), ["startup", "modeling"]);
}

#[test]
fn final_stack_after_sketch_done() {
    let lines = classify(
        "~ Command `ProCmdDashboardActivate`\n~ Command `ProCmdSketchNew`\n~ Command `ProCmdSketchDone`",
    );
    let mut issues = Vec::new();
    let ctx = check_flow(&lines, &REGISTRY, &mut issues);
    assert!(issues.is_empty());
    assert_eq!(ctx, {
        let mut expected = ExecutionContext::new();
        expected.push("modeling");
        expected
    });
}

#[test]
fn violation_still_applies_transition() {
    // SketchNew out of context still pushes `sketch_active`, so Extrude passes.
    let report = validate(
        "~ Command `ProCmdSketchNew`\n~ Command `ProCmdExtrudeDashboard`",
        &REGISTRY,
    );
    let flow = of_category(&report.issues, Category::Flow);
    assert_eq!(flow.len(), 1);
    assert_eq!(flow[0].line_number, 1);
}

// ─── Parameters ──────────────────────────────────────────────────────────────

#[test]
fn non_numeric_depth_is_parameter_issue() {
    let script = format!("{EXTRUDE_PREAMBLE}~ Input `ABC`");
    let report = validate(&script, &REGISTRY);
    assert_eq!(report.result, ValidationOutcome::ExecutionError);
    let issue = find_diag(&report.issues, codes::EXPECTED_NUMERIC).expect("TRL4001");
    assert_eq!(issue.category, Category::Parameter);
    assert_eq!(issue.line_number, 5);
    assert!(issue.message.contains("ABC"));
    assert!(issue.message.contains("depth"));
}

#[test]
fn non_finite_values_are_not_numeric() {
    for value in ["inf", "NaN", "-infinity"] {
        let script = format!("{EXTRUDE_PREAMBLE}~ Input `{value}`");
        let report = validate(&script, &REGISTRY);
        assert!(
            find_diag(&report.issues, codes::EXPECTED_NUMERIC).is_some(),
            "{value} should be rejected"
        );
    }
}

#[test]
fn numeric_literals_in_range_pass() {
    for value in ["0", "25", "1e3", "10000", " 7.5 "] {
        let script = format!("{EXTRUDE_PREAMBLE}~ Input `{value}`");
        let report = validate(&script, &REGISTRY);
        assert!(report.is_valid(), "{value}: {:?}", report.issues);
    }
}

#[test]
fn out_of_range_depth_is_parameter_issue() {
    let script = format!("{EXTRUDE_PREAMBLE}~ Input `20000`");
    let report = validate(&script, &REGISTRY);
    let issue = find_diag(&report.issues, codes::OUT_OF_RANGE).expect("TRL4002");
    assert!(issue.message.contains("[0,10000]"), "{}", issue.message);
    assert!(find_diag(&report.issues, codes::EXPECTED_NUMERIC).is_none());
}

#[test]
fn overflowing_literal_is_out_of_range() {
    let script = format!("{EXTRUDE_PREAMBLE}~ Input `1e400`");
    let report = validate(&script, &REGISTRY);
    let issue = find_diag(&report.issues, codes::OUT_OF_RANGE).expect("TRL4002");
    assert!(issue.message.contains("1e400"), "{}", issue.message);
    assert!(find_diag(&report.issues, codes::EXPECTED_NUMERIC).is_none());
}

#[test]
fn activate_line_sets_pending_command() {
    let report = validate(
        "~ Activate `ProCmdRevolveDashboard`\n~ Input `400`",
        &REGISTRY,
    );
    assert_eq!(report.issues.len(), 1);
    assert_eq!(report.issues[0].id, codes::OUT_OF_RANGE);
}

#[test]
fn inputs_beyond_declared_parameters_are_unchecked() {
    let script = format!("{EXTRUDE_PREAMBLE}~ Input `25`\n~ Input `ABC`");
    let report = validate(&script, &REGISTRY);
    assert!(report.is_valid(), "unexpected issues: {:?}", report.issues);
}

#[test]
fn input_without_pending_command_is_unchecked() {
    let report = validate("~ Input `ABC`", &REGISTRY);
    assert!(report.is_valid());
}

#[test]
fn unknown_command_clears_pending_input() {
    let script = format!("{EXTRUDE_PREAMBLE}~ Command `Nope`\n~ Input `ABC`");
    let report = validate(&script, &REGISTRY);
    assert_eq!(report.result, ValidationOutcome::SemanticError);
    assert!(of_category(&report.issues, Category::Parameter).is_empty());
}

#[test]
fn extra_args_do_not_affect_binding() {
    let script = format!("{EXTRUDE_PREAMBLE}~ Input `25` `mm`");
    assert!(validate(&script, &REGISTRY).is_valid());
}

// ─── Custom registries ───────────────────────────────────────────────────────

#[test]
fn custom_registry_drives_every_checker() {
    let registry = SpecRegistry::new(vec![
        CommandSpec::new("Open").transition(ContextTransition::push("doc")),
        CommandSpec::new("Scale")
            .in_context(&["doc"])
            .param("factor", ParamType::Numeric, Some(ParamRange::between(0.1, 10.0)))
            .param("label", ParamType::Text, None),
        CommandSpec::new("Close")
            .in_context(&["doc"])
            .transition(ContextTransition::pop("doc")),
    ])
    .expect("valid registry");

    let ok = validate(
        "~ Command `Open`\n~ Command `Scale`\n~ Input `2`\n~ Input `x`\n~ Command `Close`",
        &registry,
    );
    assert!(ok.is_valid(), "unexpected issues: {:?}", ok.issues);

    let bad = validate(
        "~ Command `Open`\n~ Command `Close`\n~ Command `Scale`\n~ Input `0`",
        &registry,
    );
    let cats: Vec<Category> = bad.issues.iter().map(|d| d.category).collect();
    assert_eq!(cats, [Category::Flow, Category::Parameter]);
}

#[test]
fn registry_is_shareable_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<SpecRegistry>();

    let registry: &SpecRegistry = &REGISTRY;
    std::thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|_| s.spawn(|| validate("~ Command `ProCmdExtrudeDashboard`", registry)))
            .collect();
        for h in handles {
            let report = h.join().expect("validator thread");
            assert_eq!(report.result, ValidationOutcome::ExecutionError);
        }
    });
}
