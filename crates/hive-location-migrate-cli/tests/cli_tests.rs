//! CLI integration tests for hive-location-migrate.
//!
//! These tests verify command-line argument parsing, help output,
//! and exit codes for configuration and connection errors.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

/// Get a command for the hive-location-migrate binary.
fn cmd() -> Command {
    Command::cargo_bin("hive-location-migrate").unwrap()
}

// =============================================================================
// Help and Version Tests
// =============================================================================

#[test]
fn test_help_shows_all_commands() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("health-check"));
}

#[test]
fn test_run_subcommand_help() {
    cmd()
        .args(["run", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--storage-account"))
        .stdout(predicate::str::contains("--partitions"))
        .stdout(predicate::str::contains("--dry-run"))
        .stdout(predicate::str::contains("--table"));
}

#[test]
fn test_version_flag() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("hive-location-migrate"));
}

#[test]
fn test_health_check_command_exists() {
    cmd()
        .args(["health-check", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Test the metastore connection"));
}

// =============================================================================
// Global Flags Tests
// =============================================================================

#[test]
fn test_help_mentions_odbc_feature() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--features odbc"));

    cmd()
        .args(["run", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--features odbc"));
}

#[test]
fn test_connection_flags_exist() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--host"))
        .stdout(predicate::str::contains("--port"))
        .stdout(predicate::str::contains("--username"))
        .stdout(predicate::str::contains("--auth"))
        .stdout(predicate::str::contains("archival-hive-server"));
}

#[test]
fn test_log_format_flag_exists() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--log-format"))
        .stdout(predicate::str::contains("[default: text]"));
}

#[test]
fn test_verbosity_flag_exists() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--verbosity"))
        .stdout(predicate::str::contains("[default: info]"));
}

#[test]
fn test_output_json_flag_exists() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--output-json"));
}

#[test]
fn test_invalid_auth_mode_rejected() {
    cmd()
        .args(["--auth", "PLAIN", "health-check"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown auth mode"));
}

// =============================================================================
// Exit Code Tests - Config Errors (Exit Code 1) and IO Errors (Exit Code 7)
// =============================================================================

#[test]
fn test_missing_config_exits_with_code_7() {
    cmd()
        .args(["--config", "nonexistent_config_file.yaml", "health-check"])
        .assert()
        .code(7); // EXIT_IO_ERROR - file not found
}

#[test]
fn test_invalid_yaml_exits_with_code_1() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "invalid: yaml: content: [").unwrap();

    cmd()
        .args(["--config", file.path().to_str().unwrap(), "health-check"])
        .assert()
        .code(1); // EXIT_CONFIG_ERROR
}

#[test]
fn test_invalid_config_values_exit_with_code_1() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "metastore:").unwrap();
    writeln!(file, "  auth: LDAP").unwrap();

    cmd()
        .args(["--config", file.path().to_str().unwrap(), "health-check"])
        .assert()
        .code(1) // EXIT_CONFIG_ERROR - LDAP without password
        .stderr(predicate::str::contains("password"));
}

#[test]
fn test_invalid_storage_account_exits_with_code_1() {
    cmd()
        .args(["run", "--storage-account", "Not_A_Valid_Account"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("storage_account"));
}

#[test]
fn test_zero_port_exits_with_code_1() {
    cmd()
        .args(["--port", "0", "health-check"])
        .assert()
        .code(1);
}

// =============================================================================
// Exit Code Tests - Connection Errors (Exit Code 2)
// =============================================================================

#[test]
fn test_unreachable_metastore_exits_with_code_2() {
    cmd()
        .args([
            "--host",
            "127.0.0.1",
            "--port",
            "1",
            "--verbosity",
            "error",
            "run",
            "--dry-run",
        ])
        .timeout(std::time::Duration::from_secs(60))
        .assert()
        .code(2) // EXIT_CONNECTION_ERROR
        .stderr(predicate::str::contains("Connection error"));
}

#[test]
fn test_password_flag_completes_ldap_config_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "metastore:").unwrap();
    writeln!(file, "  auth: LDAP").unwrap();

    cmd()
        .args([
            "--config",
            file.path().to_str().unwrap(),
            "--password",
            "pw",
            "--host",
            "127.0.0.1",
            "--port",
            "1",
            "--verbosity",
            "error",
            "health-check",
        ])
        .timeout(std::time::Duration::from_secs(60))
        .assert()
        .code(2) // flags are applied before validation, so only the connection fails
        .stderr(predicate::str::contains("Connection error"));
}

#[test]
fn test_storage_account_flag_overrides_invalid_config_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "migration:").unwrap();
    writeln!(file, "  storage_account: Bad_Name").unwrap();

    cmd()
        .args([
            "--config",
            file.path().to_str().unwrap(),
            "--host",
            "127.0.0.1",
            "--port",
            "1",
            "--verbosity",
            "error",
            "run",
            "--storage-account",
            "goodname",
            "--dry-run",
        ])
        .timeout(std::time::Duration::from_secs(60))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Connection error"));
}

// =============================================================================
// No Subcommand Tests
// =============================================================================

#[test]
fn test_no_subcommand_shows_help() {
    cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage:"));
}
