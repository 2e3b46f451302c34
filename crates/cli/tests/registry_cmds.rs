//! CLI tests for `trail commands` and `trail selftest`.

use std::process::Command;

use assert_cmd::cargo;

fn trail_cmd() -> Command {
    Command::new(cargo::cargo_bin!("trail"))
}

#[test]
fn commands_json_lists_builtin_table() {
    let output = trail_cmd()
        .args(["commands", "--output", "json"])
        .output()
        .expect("run commands");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let json: serde_json::Value = serde_json::from_str(&stdout).expect("valid json");
    assert_eq!(json["formatVersion"], "1.0.0");
    let names: Vec<&str> = json["commands"]
        .as_array()
        .expect("commands array")
        .iter()
        .map(|c| c["name"].as_str().expect("name"))
        .collect();
    assert!(names.contains(&"ProCmdDashboardActivate"));
    assert!(names.contains(&"ProCmdExtrudeDashboard"));
}

#[test]
fn commands_pretty_marks_required_commands() {
    let output = trail_cmd()
        .args(["commands", "--output", "pretty"])
        .output()
        .expect("run commands");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let activate = stdout
        .lines()
        .find(|l| l.contains("ProCmdDashboardActivate"))
        .expect("activate listed");
    assert!(activate.starts_with('*'), "line={activate}");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("3 required"), "stderr={stderr}");
}

#[test]
fn selftest_json_passes_every_builtin_fixture() {
    let output = trail_cmd()
        .args(["selftest", "--output", "json"])
        .output()
        .expect("run selftest");

    assert!(
        output.status.success(),
        "stdout={}",
        String::from_utf8_lossy(&output.stdout)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    let json: serde_json::Value = serde_json::from_str(&stdout).expect("valid json");
    assert_eq!(json["failed"], 0);
    assert_eq!(json["passed"], json["total_tests"]);
    assert_eq!(
        json["details"]["invalid_syntax"]["validation_result"],
        "syntax_error"
    );
}

#[test]
fn debug_flag_logs_to_stderr_only() {
    let output = trail_cmd()
        .args(["--debug", "explain", "TRL4001", "--output", "json"])
        .output()
        .expect("run explain with --debug");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let json: serde_json::Value = serde_json::from_str(&stdout).expect("stdout stays pure json");
    assert_eq!(json["id"], "TRL4001");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("trail starting"), "stderr={stderr}");
}
