//! End-to-end CLI tests.
//!
//! These tests run the actual binary and exercise everything that resolves
//! before the first network call: argument parsing, window validation,
//! credential lookup, and channel validation. Nothing here talks to a real
//! platform or model API.

use assert_cmd::Command;
use predicates::prelude::*;

fn chatscope() -> Command {
    let mut cmd = Command::cargo_bin("chatscope").unwrap();
    // Keep the test hermetic regardless of the developer's shell environment.
    cmd.env_remove("DISCORD_TOKEN")
        .env_remove("SLACK_TOKEN")
        .env_remove("OPENAI_API_KEY");
    cmd
}

#[test]
fn help_lists_flags_and_credentials() {
    chatscope()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--platform"))
        .stdout(predicate::str::contains("--since-days"))
        .stdout(predicate::str::contains("--model-source"))
        .stdout(predicate::str::contains("DISCORD_TOKEN"));
}

#[test]
fn version_prints() {
    chatscope()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("chatscope"));
}

#[test]
fn missing_channel_is_usage_error() {
    chatscope()
        .assert()
        .failure()
        .stderr(predicate::str::contains("CHANNEL"));
}

#[test]
fn unknown_platform_is_rejected() {
    chatscope()
        .args(["--platform", "teams", "general"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("teams"));
}

#[test]
fn negative_window_is_rejected() {
    chatscope()
        .args(["123456789012345678", "--since-days=-1"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Invalid lookback window"));
}

#[test]
fn missing_discord_token_fails_before_fetch() {
    chatscope()
        .arg("123456789012345678")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("DISCORD_TOKEN"));
}

#[test]
fn missing_slack_token_fails_before_fetch() {
    chatscope()
        .args(["--platform", "slack", "general"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("SLACK_TOKEN"));
}

#[test]
fn remote_source_requires_api_key() {
    chatscope()
        .args(["123456789012345678", "--model-source", "remote"])
        .env("DISCORD_TOKEN", "test-token")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("OPENAI_API_KEY"));
}

#[test]
fn non_numeric_discord_channel_is_rejected() {
    chatscope()
        .arg("general")
        .env("DISCORD_TOKEN", "test-token")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Invalid Discord channel"));
}

#[test]
fn empty_slack_channel_is_rejected() {
    chatscope()
        .args(["--platform", "slack", "#"])
        .env("SLACK_TOKEN", "test-token")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Invalid Slack channel"));
}
