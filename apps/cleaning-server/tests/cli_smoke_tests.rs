//! CLI smoke tests for the cleaning-server binary.

use std::net::TcpListener;
use std::process::{Command, Stdio};
use std::time::Duration;
use tempfile::TempDir;

fn run_server(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_cleaning-server"))
        .args(args)
        .env_remove("DATABASE_URL")
        .env_remove("PORT")
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .expect("Failed to execute cleaning-server")
}

fn free_port() -> u16 {
    TcpListener::bind("127.0.0.1:0")
        .and_then(|l| l.local_addr())
        .map(|a| a.port())
        .expect("free port")
}

fn write_config(dir: &TempDir, port: u16) -> std::path::PathBuf {
    let db_path = dir.path().join("data/cleaning.db");
    let uploads = dir.path().join("uploads");
    let config = format!(
        r#"
server:
  host: "127.0.0.1"
  port: {port}
  timeout_sec: 10

database:
  url: "sqlite://{db}?mode=rwc"
  max_conns: 5

logging:
  default:
    console_level: "off"
    file: ""

modules:
  cleaning_ops:
    storage:
      uploads_dir: "{uploads}"
"#,
        db = db_path.to_string_lossy().replace('\\', "/"),
        uploads = uploads.to_string_lossy().replace('\\', "/"),
    );
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, config).expect("write config");
    path
}

#[test]
fn help_lists_subcommands() {
    let output = run_server(&["--help"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage:"));
    assert!(stdout.contains("run"));
    assert!(stdout.contains("check"));
    assert!(stdout.contains("--config"));
    assert!(stdout.contains("--print-config"));
}

#[test]
fn version_prints_binary_name() {
    let output = run_server(&["--version"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("cleaning-server"));
}

#[test]
fn invalid_command_fails() {
    let output = run_server(&["invalid-command"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("error"));
}

#[test]
fn missing_config_file_fails() {
    let output = run_server(&["--config", "/nonexistent/config.yaml", "check"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("config file not found"), "{stderr}");
}

#[test]
fn invalid_yaml_fails() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("invalid.yaml");
    std::fs::write(&path, "server: [unclosed").unwrap();

    let output = run_server(&["--config", path.to_str().unwrap(), "check"]);
    assert!(!output.status.success());
}

#[test]
fn check_accepts_valid_config() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, 4100);

    let output = run_server(&["--config", path.to_str().unwrap(), "check"]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Configuration check passed"));
    assert!(stdout.contains("port: 4100"));
}

#[test]
fn print_config_applies_port_override_and_shares_uploads_dir() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, 4100);

    let output = run_server(&[
        "--config",
        path.to_str().unwrap(),
        "--port",
        "4200",
        "--print-config",
    ]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("port: 4200"));
    assert!(stdout.contains("api_ingress"));
}

#[test]
fn run_without_database_fails() {
    let output = run_server(&["run"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Database URL not configured"), "{stderr}");
}

#[tokio::test]
async fn run_serves_health_until_killed() {
    let dir = TempDir::new().unwrap();
    let port = free_port();
    let path = write_config(&dir, port);

    let mut child = tokio::process::Command::new(env!("CARGO_BIN_EXE_cleaning-server"))
        .args(["--config", path.to_str().unwrap(), "run"])
        .env_remove("DATABASE_URL")
        .env_remove("PORT")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn()
        .expect("spawn cleaning-server");

    let url = format!("http://127.0.0.1:{port}/api/health");
    let mut healthy = None;
    for _ in 0..100 {
        if let Ok(resp) = reqwest::get(&url).await {
            healthy = Some(resp.json::<serde_json::Value>().await.unwrap());
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    child.kill().await.ok();

    assert_eq!(healthy, Some(serde_json::json!({"ok": true})));
}
