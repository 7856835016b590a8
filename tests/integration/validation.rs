//! Integration tests for startup validation through the binary
//!
//! Every case here must fail before any request is made, so the URL points
//! at a port nobody listens on.

use assert_cmd::Command;
use std::fs;
use tempfile::TempDir;

const DEAD_URL: &str = "http://127.0.0.1:9/logs";

fn downloader() -> Command {
    let mut cmd = Command::cargo_bin("cloudflare-logs-downloader").unwrap();
    cmd.env_remove("CF_AUTH_EMAIL")
        .env_remove("CF_AUTH_KEY")
        .env_remove("CF_LOGS_URL")
        .env_remove("RUST_LOG")
        .env_remove("LOG_FORMAT");
    cmd
}

fn stderr_of(cmd: &mut Command) -> String {
    let output = cmd.output().unwrap();
    assert!(!output.status.success(), "expected a failing exit status");
    String::from_utf8_lossy(&output.stderr).to_string()
}

#[test]
fn test_no_arguments_fails() {
    let stderr = stderr_of(&mut downloader());
    assert!(stderr.contains("no auth email provided"), "{stderr}");
}

#[test]
fn test_missing_key_fails() {
    let stderr = stderr_of(downloader().args(["--auth-email", "ops@example.com"]));
    assert!(stderr.contains("no auth key provided"), "{stderr}");
}

#[test]
fn test_missing_url_fails() {
    let stderr = stderr_of(downloader().args([
        "--auth-email",
        "ops@example.com",
        "--auth-key",
        "CF",
    ]));
    assert!(stderr.contains("no url provided"), "{stderr}");
}

#[test]
fn test_credentials_from_environment() {
    let temp_dir = TempDir::new().unwrap();

    // Credentials and URL come from env; the run then fails on end <= start
    let stderr = stderr_of(
        downloader()
            .env("CF_AUTH_EMAIL", "ops@example.com")
            .env("CF_AUTH_KEY", "CF")
            .env("CF_LOGS_URL", DEAD_URL)
            .args(["--start", "100", "--end", "100", "--max-age", "100years"])
            .arg("--dir")
            .arg(temp_dir.path()),
    );
    assert!(stderr.contains("is not after start"), "{stderr}");
}

#[test]
fn test_negative_end_fails() {
    let temp_dir = TempDir::new().unwrap();

    let stderr = stderr_of(
        downloader()
            .args([
                "--auth-email",
                "ops@example.com",
                "--auth-key",
                "CF",
                "--url",
                DEAD_URL,
                "--start",
                "0",
                "--end",
                "-1",
                "--max-age",
                "100years",
            ])
            .arg("--dir")
            .arg(temp_dir.path()),
    );
    assert!(stderr.contains("the provided end (-1) is < 0"), "{stderr}");
}

#[test]
fn test_start_too_old_fails() {
    let temp_dir = TempDir::new().unwrap();

    let stderr = stderr_of(
        downloader()
            .args([
                "--auth-email",
                "ops@example.com",
                "--auth-key",
                "CF",
                "--url",
                DEAD_URL,
                "--start",
                "0",
            ])
            .arg("--dir")
            .arg(temp_dir.path()),
    );
    assert!(stderr.contains("old"), "{stderr}");
}

#[test]
fn test_missing_directory_fails() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("nope");

    let stderr = stderr_of(
        downloader()
            .args([
                "--auth-email",
                "ops@example.com",
                "--auth-key",
                "CF",
                "--url",
                DEAD_URL,
                "--start",
                "0",
                "--end",
                "60",
                "--max-age",
                "100years",
            ])
            .arg("--dir")
            .arg(&missing),
    );
    assert!(stderr.contains("does not exist"), "{stderr}");
}

#[test]
fn test_missing_checkpoint_fails() {
    let temp_dir = TempDir::new().unwrap();

    let stderr = stderr_of(
        downloader()
            .args([
                "--auth-email",
                "ops@example.com",
                "--auth-key",
                "CF",
                "--url",
                DEAD_URL,
            ])
            .arg("--dir")
            .arg(temp_dir.path()),
    );
    assert!(stderr.contains("failed to read checkpoint file"), "{stderr}");
}

#[test]
fn test_corrupt_checkpoint_fails() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("checkpoint"), "twelve").unwrap();

    let stderr = stderr_of(
        downloader()
            .args([
                "--auth-email",
                "ops@example.com",
                "--auth-key",
                "CF",
                "--url",
                DEAD_URL,
            ])
            .arg("--dir")
            .arg(temp_dir.path()),
    );
    assert_eq!(stderr.matches("corrupt checkpoint").count(), 1, "{stderr}");
}

#[test]
fn test_sub_second_interval_fails() {
    let temp_dir = TempDir::new().unwrap();

    let stderr = stderr_of(
        downloader()
            .args([
                "--auth-email",
                "ops@example.com",
                "--auth-key",
                "CF",
                "--url",
                DEAD_URL,
                "--start",
                "0",
                "--end",
                "60",
                "--max-age",
                "100years",
                "--interval",
                "500ms",
            ])
            .arg("--dir")
            .arg(temp_dir.path()),
    );
    assert!(stderr.contains("less than one second"), "{stderr}");
}

#[test]
fn test_validation_failure_writes_nothing() {
    let temp_dir = TempDir::new().unwrap();

    downloader()
        .args([
            "--auth-email",
            "ops@example.com",
            "--auth-key",
            "CF",
            "--url",
            DEAD_URL,
            "--start",
            "60",
            "--end",
            "60",
            "--max-age",
            "100years",
        ])
        .arg("--dir")
        .arg(temp_dir.path())
        .assert()
        .failure();

    assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 0);
}

#[test]
fn test_help_lists_flags() {
    let output = downloader().arg("--help").output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    for flag in [
        "--auth-email",
        "--auth-key",
        "--url",
        "--start",
        "--max-age",
        "--end",
        "--interval",
        "--dir",
    ] {
        assert!(stdout.contains(flag), "missing {flag} in help");
    }
}
