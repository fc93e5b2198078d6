//! CLI smoke tests for the cleaning-cli binary.

use std::process::{Command, Stdio};

fn run_cli(identity: &std::path::Path, args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_cleaning-cli"))
        .args(args)
        .env("CLEANING_IDENTITY_FILE", identity)
        // nothing listens here
        .env("CLEANING_API_URL", "http://127.0.0.1:9")
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .expect("Failed to execute cleaning-cli")
}

#[test]
fn help_lists_role_commands() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_cli(&dir.path().join("id.json"), &["--help"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    for cmd in ["login", "switch-user", "register", "dashboard", "set-break", "--api-url"] {
        assert!(stdout.contains(cmd), "missing {cmd} in help");
    }
}

#[test]
fn commands_without_identity_exit_non_zero() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_cli(&dir.path().join("id.json"), &["tasks"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("not logged in"));
}

#[test]
fn failed_login_exits_non_zero_and_caches_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let identity = dir.path().join("id.json");
    let output = run_cli(&identity, &["login", "--name", "Ana", "--role", "cleaner"]);
    assert!(!output.status.success());
    assert!(!identity.exists());
}

#[test]
fn unknown_terminal_is_rejected_by_the_parser() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_cli(
        &dir.path().join("id.json"),
        &["register", "--ppu", "AB12", "--terminal", "NOWHERE", "--type", "FULL"],
    );
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("NOWHERE"));
}
