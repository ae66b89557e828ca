#![allow(clippy::unwrap_used, clippy::expect_used)]

//! CLI smoke tests for the ifrof-server binary: help output, configuration
//! validation and the user/token commands against a file-backed SQLite
//! database.

use std::path::Path;
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

fn run_ifrof_server(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_ifrof-server"))
        .args(args)
        .env_remove("RUST_LOG")
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .expect("Failed to execute ifrof-server")
}

fn write_config(dir: &TempDir, content: &str) -> String {
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, content).expect("Failed to write config");
    path.to_string_lossy().into_owned()
}

/// Config pointing at a fresh SQLite file inside `dir`.
fn sqlite_config(dir: &TempDir) -> String {
    let db = dir.path().join("ifrof.db");
    write_config(dir, &format!("database:\n  dsn: \"sqlite://{}?mode=rwc\"\n", db_path(&db)))
}

fn db_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_cli_help_command() {
    let output = run_ifrof_server(&["--help"]);
    assert!(output.status.success(), "Help command should succeed");

    let stdout = stdout(&output);
    assert!(stdout.contains("Usage:"), "Should contain usage information");
    for subcommand in ["run", "check", "issue-token", "create-user"] {
        assert!(stdout.contains(subcommand), "Should list '{subcommand}'");
    }
    assert!(stdout.contains("--config"), "Should mention config option");
    assert!(stdout.contains("--print-config"));
}

#[test]
fn test_cli_version_command() {
    let output = run_ifrof_server(&["--version"]);
    assert!(output.status.success(), "Version command should succeed");
    assert!(stdout(&output).contains("ifrof-server"));
}

#[test]
fn test_cli_invalid_command() {
    let output = run_ifrof_server(&["definitely-not-a-command"]);
    assert!(!output.status.success(), "Invalid command should fail");
    assert!(stderr(&output).contains("unrecognized subcommand"));
}

#[test]
fn test_cli_config_validation_missing_file() {
    let output = run_ifrof_server(&["--config", "/nonexistent/ifrof.yaml", "check"]);
    assert!(!output.status.success(), "Should fail with missing config file");
    assert!(
        stderr(&output).contains("does not exist"),
        "Should mention the missing file"
    );
}

#[test]
fn test_cli_config_validation_invalid_yaml() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "server:\n  port: [not, a, port\n");

    let output = run_ifrof_server(&["--config", &path, "check"]);
    assert!(!output.status.success(), "Should fail with invalid YAML");
}

#[test]
fn test_cli_config_validation_rejects_unsafe_cors() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        "cors:\n  allowed_origins: [\"*\"]\n  allow_credentials: true\n",
    );

    let output = run_ifrof_server(&["--config", &path, "check"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("allow_credentials"));
}

#[test]
fn test_cli_config_validation_valid_config() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
server:
  port: 9321
payments:
  provider: stripe
  stripe_secret_key: "sk_test_do_not_print"
ai:
  model: "gpt-4o"
logging:
  format: json
"#,
    );

    let output = run_ifrof_server(&["--config", &path, "check"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let stdout = stdout(&output);
    assert!(stdout.contains("Configuration is valid"));
    assert!(stdout.contains("9321"));
    assert!(stdout.contains("gpt-4o"));
    assert!(!stdout.contains("sk_test_do_not_print"), "Secrets must be redacted");
}

#[test]
fn test_cli_print_config_is_yaml() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "server:\n  port: 9400\n");

    let output = run_ifrof_server(&["-c", &path, "--print-config", "--port", "9500"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let stdout = stdout(&output);
    let yaml = stdout
        .strip_prefix("Effective configuration:\n")
        .expect("header line");
    let parsed: serde_json::Value = serde_saphyr::from_str(yaml).expect("valid YAML");
    assert_eq!(parsed["server"]["port"], 9500, "CLI port wins over the file");
    assert_eq!(parsed["auth"]["cookie_name"], "ifrof_session");
    assert_eq!(parsed["auth"]["session_secret"], "***");
}

#[test]
fn test_cli_subcommand_help() {
    let output = run_ifrof_server(&["create-user", "--help"]);
    assert!(output.status.success());
    let stdout = stdout(&output);
    assert!(stdout.contains("--role"));
    assert!(stdout.contains("--factory"));
}

#[test]
fn test_cli_create_user_then_issue_token() {
    let dir = TempDir::new().unwrap();
    let path = sqlite_config(&dir);

    let output = run_ifrof_server(&[
        "-c",
        &path,
        "create-user",
        "--role",
        "admin",
        "--name",
        "Ops",
        "--email",
        "ops@ifrof.example",
    ]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let stdout = stdout(&output);
    let id = stdout
        .lines()
        .find_map(|l| l.strip_prefix("id: "))
        .expect("id line")
        .to_owned();
    assert!(stdout.contains("role: admin"));
    assert!(stdout.lines().any(|l| l.starts_with("token: ")));

    let output = run_ifrof_server(&["-c", &path, "issue-token", "--user", &id]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let token = self::stdout(&output);
    assert_eq!(token.trim().split('.').count(), 3, "Token should be a JWT");
}

#[test]
fn test_cli_issue_token_for_unknown_user_fails() {
    let dir = TempDir::new().unwrap();
    let path = sqlite_config(&dir);

    let output = run_ifrof_server(&[
        "-c",
        &path,
        "issue-token",
        "--user",
        "00000000-0000-0000-0000-000000000001",
    ]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("cannot issue a token"));
}

#[test]
fn test_cli_create_user_rejects_unknown_role() {
    let output = run_ifrof_server(&["create-user", "--role", "superuser"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("unknown role"));
}

#[test]
fn test_cli_example_config_is_valid() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../../config/ifrof.example.yaml");
    let output = run_ifrof_server(&["-c", path, "check"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(!stdout(&output).contains("change-me"));
}
