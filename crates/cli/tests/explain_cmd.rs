//! CLI tests for the `z explain` subcommand.

use std::process::Command;

use assert_cmd::cargo;

fn z_cmd() -> Command {
    Command::new(cargo::cargo_bin!("z"))
}

#[test]
fn explain_known_code_json_returns_explanation() {
    let output = z_cmd()
        .args(["explain", "Z1102", "--output", "json"])
        .output()
        .expect("run explain command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let json: serde_json::Value = serde_json::from_str(&stdout).expect("valid json");
    assert_eq!(json["id"], "Z1102");
    assert!(json["explanation"].is_string());
    assert_eq!(json["severity"], "error");
}

#[test]
fn explain_unknown_code_json_returns_null_explanation() {
    let output = z_cmd()
        .args(["explain", "Z9999", "--output", "json"])
        .output()
        .expect("run explain command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let json: serde_json::Value = serde_json::from_str(&stdout).expect("valid json");
    assert_eq!(json["id"], "Z9999");
    assert!(json["explanation"].is_null());
}

#[test]
fn explain_pretty_shows_human_readable_text() {
    let output = z_cmd()
        .args(["explain", "Z2001", "--output", "pretty"])
        .output()
        .expect("run explain command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("Z2001") && stdout.contains(':'),
        "unexpected output: {stdout}"
    );
}
