//! CLI smoke tests for the calendar-server binary
//!
//! These tests verify that the CLI commands work correctly, including
//! configuration validation, help output, migrations and server startup.

use std::path::Path;
use std::process::{Command, Stdio};
use std::time::Duration;
use tempfile::TempDir;
use tokio::time::timeout;

/// Helper to run the calendar-server binary with given arguments
fn run_calendar_server(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_calendar-server"))
        .args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .expect("Failed to execute calendar-server")
}

/// Helper to run the calendar-server binary with timeout
async fn run_calendar_server_with_timeout(
    args: &[&str],
    timeout_duration: Duration,
) -> Result<std::process::Output, Box<dyn std::error::Error>> {
    let mut cmd = tokio::process::Command::new(env!("CARGO_BIN_EXE_calendar-server"));
    cmd.args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    match timeout(timeout_duration, cmd.output()).await {
        Ok(result) => result.map_err(|e| e.into()),
        Err(elapsed) => Err(elapsed.into()),
    }
}

/// Config with home_dir pinned inside the temp dir so nothing leaks into $HOME.
fn write_config(dir: &Path, name: &str, body: &str) -> String {
    let home = dir.join("home").to_string_lossy().replace('\\', "/");
    let content = format!(
        "server:\n  home_dir: \"{home}\"\n  host: \"127.0.0.1\"\n  port: 0\n{body}"
    );
    let path = dir.join(name);
    std::fs::write(&path, content).expect("Failed to write config file");
    path.to_string_lossy().to_string()
}

#[test]
fn test_cli_help_command() {
    let output = run_calendar_server(&["--help"]);

    assert!(output.status.success(), "Help command should succeed");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("calendar-server") || stdout.contains("Calendar Server"),
        "Should contain binary name"
    );
    assert!(
        stdout.contains("Usage:") || stdout.contains("USAGE:"),
        "Should contain usage information"
    );
    assert!(stdout.contains("run"), "Should contain 'run' subcommand");
    assert!(stdout.contains("check"), "Should contain 'check' subcommand");
    assert!(
        stdout.contains("migrate"),
        "Should contain 'migrate' subcommand"
    );
    assert!(stdout.contains("--config"), "Should mention config option");
    assert!(stdout.contains("--mock"), "Should mention mock option");
}

#[test]
fn test_cli_version_command() {
    let output = run_calendar_server(&["--version"]);

    assert!(output.status.success(), "Version command should succeed");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("calendar-server"), "Should contain binary name");
    assert!(
        stdout.chars().any(|c| c.is_ascii_digit()),
        "Should contain version numbers"
    );
}

#[test]
fn test_cli_invalid_command() {
    let output = run_calendar_server(&["invalid-command"]);

    assert!(!output.status.success(), "Invalid command should fail");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("error") || stderr.contains("invalid") || stderr.contains("unexpected"),
        "Should contain error message about invalid command"
    );
}

#[test]
fn test_cli_config_validation_missing_file() {
    let output = run_calendar_server(&["--config", "/nonexistent/config.yaml", "check"]);

    assert!(!output.status.success(), "Should fail with missing config");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("config") || stderr.contains("file") || stderr.contains("found"),
        "Should mention config file issue: {}",
        stderr
    );
}

#[test]
fn test_cli_config_flag_short_form() {
    let output = run_calendar_server(&["-c", "/nonexistent/config.yaml", "check"]);

    assert!(
        !output.status.success(),
        "Should fail with missing config file"
    );

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("config") || stderr.contains("file") || stderr.contains("found"),
        "Should mention config file issue with short flag: {}",
        stderr
    );
}

#[test]
fn test_cli_config_validation_invalid_yaml() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("invalid.yaml");

    std::fs::write(&config_path, "invalid: yaml: content: [unclosed")
        .expect("Failed to write file");

    let output = run_calendar_server(&["--config", config_path.to_str().unwrap(), "check"]);

    assert!(!output.status.success(), "Should fail with invalid YAML");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("yaml") || stderr.contains("parse") || stderr.contains("format"),
        "Should mention YAML parsing issue: {}",
        stderr
    );
}

#[test]
fn test_cli_config_validation_valid_config() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = write_config(
        temp_dir.path(),
        "valid.yaml",
        r#"
database:
  url: "sqlite://calendar.db?mode=rwc"

logging:
  default:
    console_level: info
    file: "logs/calendar.log"
    file_level: info
    max_backups: 3
    max_size_mb: 10

modules:
  calendar:
    bcrypt_cost: 4
"#,
    );

    let output = run_calendar_server(&["--config", &config_path, "check"]);

    if !output.status.success() {
        eprintln!("STDERR: {}", String::from_utf8_lossy(&output.stderr));
        eprintln!("STDOUT: {}", String::from_utf8_lossy(&output.stdout));
    }
    assert!(output.status.success(), "Should succeed with valid config");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("Configuration check passed"),
        "Should indicate successful validation: {}",
        stdout
    );
}

#[test]
fn test_cli_check_rejects_unknown_module_keys() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = write_config(
        temp_dir.path(),
        "module.yaml",
        "modules:\n  calendar:\n    page_size: 10\n",
    );

    let output = run_calendar_server(&["--config", &config_path, "check"]);

    assert!(!output.status.success(), "Unknown module keys should fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("calendar"),
        "Should name the offending module: {}",
        stderr
    );
}

#[test]
fn test_cli_check_rejects_out_of_range_module_values() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    for (name, body, needle) in [
        ("cost.yaml", "modules:\n  calendar:\n    bcrypt_cost: 40\n", "bcrypt_cost"),
        ("name.yaml", "modules:\n  calendar:\n    max_name_length: 1000\n", "max_name_length"),
    ] {
        let config_path = write_config(temp_dir.path(), name, body);

        let output = run_calendar_server(&["--config", &config_path, "check"]);

        assert!(!output.status.success(), "{needle} out of range should fail");
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains(needle), "Should name {needle}: {}", stderr);
    }
}

#[test]
fn test_cli_run_command_config_validation() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = write_config(
        temp_dir.path(),
        "invalid.yaml",
        r#"
logging:
  level: "info"
"#,
    );

    let output = run_calendar_server(&["--config", &config_path, "run"]);

    assert!(!output.status.success(), "Should fail with malformed logging");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("parse") || stderr.contains("invalid"),
        "Should mention config parsing issue: {}",
        stderr
    );
}

#[test]
fn test_cli_mock_flag() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = write_config(
        temp_dir.path(),
        "mock.yaml",
        r#"
database:
  url: "redis://localhost/nonexistent"
"#,
    );

    // The database section is ignored entirely under --mock
    let output = run_calendar_server(&["--config", &config_path, "--mock", "check"]);

    if !output.status.success() {
        eprintln!("STDERR: {}", String::from_utf8_lossy(&output.stderr));
        eprintln!("STDOUT: {}", String::from_utf8_lossy(&output.stdout));
    }
    assert!(
        output.status.success(),
        "Should succeed under --mock even if the database config is unusable"
    );

    let output = run_calendar_server(&["--config", &config_path, "check"]);
    assert!(
        !output.status.success(),
        "Unsupported database scheme should fail without --mock"
    );
}

#[test]
fn test_cli_print_config() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = write_config(temp_dir.path(), "print.yaml", "");

    let output = run_calendar_server(&["--config", &config_path, "--port", "9123", "--print-config"]);

    assert!(output.status.success(), "Print config should succeed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("server:"), "Should print YAML: {}", stdout);
    assert!(stdout.contains("9123"), "Port override should apply: {}", stdout);
}

#[test]
fn test_cli_migrate_creates_sqlite_database() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = write_config(
        temp_dir.path(),
        "migrate.yaml",
        r#"
database:
  url: "sqlite://data/calendar.db?mode=rwc"
"#,
    );

    let output = run_calendar_server(&["--config", &config_path, "migrate"]);

    if !output.status.success() {
        eprintln!("STDERR: {}", String::from_utf8_lossy(&output.stderr));
    }
    assert!(output.status.success(), "Migrate should succeed");
    assert!(
        temp_dir.path().join("home/data/calendar.db").is_file(),
        "SQLite file should be created under home_dir"
    );

    // Second run is a no-op
    let output = run_calendar_server(&["--config", &config_path, "migrate"]);
    assert!(output.status.success(), "Repeated migrate should succeed");
}

#[test]
fn test_cli_migrate_requires_database() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = write_config(temp_dir.path(), "nodb.yaml", "");

    let output = run_calendar_server(&["--config", &config_path, "migrate"]);

    assert!(!output.status.success(), "Migrate without database should fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("database"), "Should mention database: {}", stderr);
}

#[tokio::test]
async fn test_cli_run_command_with_sqlite_database() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = write_config(
        temp_dir.path(),
        "test.yaml",
        r#"
database:
  url: "sqlite://calendar.db?mode=rwc"

modules:
  calendar:
    bcrypt_cost: 4
"#,
    );

    let result = run_calendar_server_with_timeout(
        &["--config", &config_path, "run"],
        Duration::from_secs(10),
    )
    .await;

    // Server should start and keep running until the timeout
    match result {
        Err(err) => {
            if !err.to_string().contains("elapsed") {
                panic!("Server should start successfully: {}", err);
            }
        }
        Ok(output) => {
            eprintln!("STDOUT: {}", String::from_utf8_lossy(&output.stdout));
            eprintln!("STDERR: {}", String::from_utf8_lossy(&output.stderr));
            panic!("Server exited early with {}", output.status);
        }
    }
}

#[test]
fn test_cli_verbose_flag() {
    let output = run_calendar_server(&["--verbose", "--help"]);

    assert!(output.status.success(), "Verbose help should succeed");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("Usage:") || stdout.contains("USAGE:"),
        "Should still contain usage information"
    );
}

#[test]
fn test_cli_subcommand_help() {
    for (sub, needle) in [("run", "server"), ("check", "configuration"), ("migrate", "migrations")] {
        let output = run_calendar_server(&[sub, "--help"]);

        assert!(output.status.success(), "{sub} --help should succeed");
        let stdout = String::from_utf8_lossy(&output.stdout).to_lowercase();
        assert!(
            stdout.contains(needle),
            "{sub} help should describe the command: {}",
            stdout
        );
    }
}
