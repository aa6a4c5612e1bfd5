//! CLI smoke tests for the cityhub-server binary

use std::path::Path;
use std::process::{Command, Stdio};
use std::time::Duration;
use tempfile::TempDir;
use tokio::time::timeout;

fn run_cityhub_server(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_cityhub-server"))
        .args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .expect("Failed to execute cityhub-server")
}

/// Write a config whose home dir and logs stay inside `dir`.
fn write_config(dir: &Path, name: &str, extra: &str) -> String {
    let home = dir.join("home").to_string_lossy().replace('\\', "/");
    let content = format!(
        r#"
server:
  home_dir: "{home}"
  host: "127.0.0.1"
  port: 0

logging:
  default:
    console_level: info
    file: ""
{extra}
"#
    );
    let path = dir.join(name);
    std::fs::write(&path, content).expect("Failed to write config file");
    path.to_string_lossy().to_string()
}

#[test]
fn test_cli_help_command() {
    let output = run_cityhub_server(&["--help"]);

    assert!(output.status.success(), "Help command should succeed");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("cityhub-server"));
    assert!(stdout.contains("Usage:"));
    assert!(stdout.contains("run"));
    assert!(stdout.contains("check"));
    assert!(stdout.contains("--config"));
    assert!(stdout.contains("--mock"));
}

#[test]
fn test_cli_version_command() {
    let output = run_cityhub_server(&["--version"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("cityhub-server"));
    assert!(stdout.chars().any(|c| c.is_ascii_digit()));
}

#[test]
fn test_cli_invalid_command() {
    let output = run_cityhub_server(&["invalid-command"]);

    assert!(!output.status.success(), "Invalid command should fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error"), "{stderr}");
}

#[test]
fn test_cli_missing_config_file() {
    for flag in ["--config", "-c"] {
        let output = run_cityhub_server(&[flag, "/nonexistent/config.yaml", "check"]);

        assert!(!output.status.success(), "Should fail with missing config");
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("not found"), "{stderr}");
    }
}

#[test]
fn test_cli_invalid_yaml() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("invalid.yaml");
    std::fs::write(&config_path, "invalid: yaml: content: [unclosed")
        .expect("Failed to write file");

    let output = run_cityhub_server(&["--config", config_path.to_str().unwrap(), "check"]);

    assert!(!output.status.success(), "Should fail with invalid YAML");
}

#[test]
fn test_cli_check_valid_config() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = write_config(
        temp_dir.path(),
        "valid.yaml",
        "database:\n  url: \"sqlite://database/cities.db\"\nmodules:\n  cities:\n    max_page_size: 25\n",
    );

    let output = run_cityhub_server(&["--config", &config_path, "check"]);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(stdout.contains("Configuration check passed"));
    assert!(stdout.contains("max_page_size: 25"));
}

#[test]
fn test_cli_check_rejects_malformed_cities_section() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = write_config(
        temp_dir.path(),
        "bad_cities.yaml",
        "modules:\n  cities:\n    page_size: 25\n",
    );

    let output = run_cityhub_server(&["--config", &config_path, "check"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid cities config"), "{stderr}");
}

#[test]
fn test_cli_check_rejects_unsupported_database() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = write_config(
        temp_dir.path(),
        "pg.yaml",
        "database:\n  url: \"postgresql://localhost/nonexistent\"\n",
    );

    let output = run_cityhub_server(&["--config", &config_path, "check"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Unsupported database type"), "{stderr}");

    // --mock replaces the configured database
    let output = run_cityhub_server(&["--config", &config_path, "--mock", "check"]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn test_cli_print_config_applies_overrides() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = write_config(temp_dir.path(), "print.yaml", "");

    let output = run_cityhub_server(&[
        "--config",
        &config_path,
        "--port",
        "9123",
        "--mock",
        "--print-config",
    ]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("port: 9123"), "{stdout}");
    assert!(stdout.contains("sqlite::memory:"), "{stdout}");
}

#[test]
fn test_cli_subcommand_help() {
    let output = run_cityhub_server(&["run", "--help"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Start the server"));

    let output = run_cityhub_server(&["check", "--help"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Check configuration"));
}

#[tokio::test]
async fn test_cli_run_with_mock_database_keeps_serving() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = write_config(temp_dir.path(), "run.yaml", "");

    let mut cmd = tokio::process::Command::new(env!("CARGO_BIN_EXE_cityhub-server"));
    cmd.args(["--config", &config_path, "--mock", "run"])
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    // A healthy server never exits on its own
    match timeout(Duration::from_secs(5), cmd.output()).await {
        Err(_elapsed) => {}
        Ok(result) => {
            let output = result.expect("Failed to run cityhub-server");
            panic!(
                "Server exited early with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr)
            );
        }
    }
}
