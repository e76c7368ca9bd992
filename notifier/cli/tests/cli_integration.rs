//! Integration tests for the release-notifier CLI.
//!
//! These tests verify end-to-end CLI behavior using assert_cmd. The
//! environment is cleared for every run so workflow variables of the host
//! running the tests cannot leak in.

use assert_cmd::Command;
use predicates::prelude::*;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn notifier_cmd() -> Command {
    let mut cmd = Command::cargo_bin("release-notifier").unwrap();
    cmd.env_clear();
    cmd
}

fn with_event_env(cmd: &mut Command, git_ref: &str, api_url: &str) {
    cmd.env("GITHUB_ACTOR", "octocat")
        .env("GITHUB_REPOSITORY", "acme/widget")
        .env("GITHUB_REF", git_ref)
        .env("GITHUB_EVENT_NAME", "release")
        .env("GH_EVENT_ACTIVITY", "published")
        .env("GITHUB_SERVER_URL", "https://github.com")
        .env("GITHUB_API_URL", api_url)
        .env("GH_API_TOKEN", "ghp_test");
}

async fn github_with_releases(tags: &[&str]) -> MockServer {
    let server = MockServer::start().await;
    let body: Vec<serde_json::Value> = tags
        .iter()
        .map(|tag| serde_json::json!({ "tag_name": tag, "draft": false, "prerelease": false }))
        .collect();

    Mock::given(method("GET"))
        .and(path("/repos/acme/widget/releases"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    server
}

#[test]
fn cli_shows_help() {
    notifier_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Announce a published release in Slack"))
        .stdout(predicate::str::contains("--lookback-limit"))
        .stdout(predicate::str::contains("--dry-run"))
        .stdout(predicate::str::contains("GITHUB_REF"));
}

#[test]
fn cli_shows_version() {
    notifier_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("release-notifier 0.1.0"));
}

#[test]
fn cli_reports_first_missing_value() {
    notifier_cmd()
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains(
            "value should not be empty: --actor (GITHUB_ACTOR)",
        ));
}

#[test]
fn cli_requires_slack_settings_without_dry_run() {
    let mut cmd = notifier_cmd();
    with_event_env(&mut cmd, "refs/tags/v1.0.0", "http://127.0.0.1:1");

    cmd.assert().failure().stderr(predicate::str::contains(
        "--slack-token (SLACK_API_TOKEN)",
    ));
}

#[test]
fn cli_rejects_out_of_range_page_size() {
    notifier_cmd()
        .args(["--page-size", "500"])
        .assert()
        .failure()
        .code(2);
}

#[tokio::test(flavor = "multi_thread")]
async fn cli_dry_run_prints_message() {
    let github = github_with_releases(&["v1.5.0", "v1.4.9", "v1.4.0", "bad-tag", "v1.3.0"]).await;

    let mut cmd = notifier_cmd();
    with_event_env(&mut cmd, "refs/tags/v1.5.0", &github.uri());

    cmd.arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "<https://github.com/acme/widget/releases/tag/v1.5.0|acme/widget v1.5.0>",
        ))
        .stdout(predicate::str::contains("compare/v1.4.9...v1.5.0"));
}

#[tokio::test(flavor = "multi_thread")]
async fn cli_dry_run_without_previous_release() {
    let github = github_with_releases(&["v0.1.0"]).await;

    let mut cmd = notifier_cmd();
    with_event_env(&mut cmd, "refs/tags/v0.1.0", &github.uri());

    cmd.arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "no previous minor or major release found",
        ));
}

#[tokio::test(flavor = "multi_thread")]
async fn cli_posts_to_slack() {
    let github = github_with_releases(&["2.0.0", "1.9.9", "1.9.8"]).await;
    let slack = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat.postMessage"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"ok": true}"#))
        .expect(1)
        .mount(&slack)
        .await;

    let mut cmd = notifier_cmd();
    with_event_env(&mut cmd, "refs/tags/2.0.0", &github.uri());

    cmd.env("SLACK_API_URL", slack.uri())
        .env("SLACK_API_TOKEN", "xoxb-test")
        .env("SLACK_CHANNEL_ID", "C123")
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn cli_fails_on_malformed_release_ref() {
    let github = github_with_releases(&[]).await;

    let mut cmd = notifier_cmd();
    with_event_env(&mut cmd, "refs/heads/main", &github.uri());

    cmd.arg("--dry-run")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("malformed version string"))
        .stdout(predicate::str::is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn cli_fails_when_slack_rejects_message() {
    let github = github_with_releases(&["1.1.0", "1.0.0"]).await;
    let slack = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat.postMessage"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(r#"{"ok": false, "error": "not_in_channel"}"#),
        )
        .mount(&slack)
        .await;

    let mut cmd = notifier_cmd();
    with_event_env(&mut cmd, "refs/tags/1.1.0", &github.uri());

    cmd.env("SLACK_API_URL", slack.uri())
        .env("SLACK_API_TOKEN", "xoxb-test")
        .env("SLACK_CHANNEL_ID", "C123")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Slack API error: not_in_channel"));
}

#[tokio::test(flavor = "multi_thread")]
async fn cli_fails_when_github_rejects_token() {
    let github = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/acme/widget/releases"))
        .respond_with(
            ResponseTemplate::new(401).set_body_string(r#"{"message": "Bad credentials"}"#),
        )
        .mount(&github)
        .await;

    let mut cmd = notifier_cmd();
    with_event_env(&mut cmd, "refs/tags/v1.0.0", &github.uri());

    cmd.arg("--dry-run")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Bad credentials"))
        .stdout(predicate::str::is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn cli_accepts_separated_tag_prefix() {
    let github = github_with_releases(&["release-2.1.0", "release-2.0.3", "release-1.9.0"]).await;

    let mut cmd = notifier_cmd();
    with_event_env(&mut cmd, "refs/tags/release-2.1.0", &github.uri());

    cmd.arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("compare/release-2.0.3...release-2.1.0"));
}
