//! Binary-level tests for the login/logout session flow against a mock
//! backend.

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use tempfile::tempdir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_is_setup(server: &MockServer, setup: bool) {
    Mock::given(method("GET"))
        .and(path("/is_setup"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "setup": setup,
            "password": true,
            "oidc": "",
        })))
        .mount(server)
        .await;
}

async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "tok-cli"})))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 1,
            "name": "admin",
            "email": "admin@example.com",
            "has_password": true,
            "role": 1,
        })))
        .mount(server)
        .await;
}

/// Test: status reports an unconfigured backend.
#[tokio::test(flavor = "multi_thread")]
async fn test_status_reports_unconfigured_backend() {
    let home = tempdir().unwrap();
    let server = MockServer::start().await;
    mount_is_setup(&server, false).await;

    cargo_bin_cmd!("certdesk")
        .env("CERTDESK_HOME", home.path())
        .args(["--server", server.uri().as_str(), "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("not set up"));
}

/// Test: login stores a session, status shows it, logout removes it.
#[tokio::test(flavor = "multi_thread")]
async fn test_login_status_logout_flow() {
    let home = tempdir().unwrap();
    let session_path = home.path().join("session.json");
    let server = MockServer::start().await;
    mount_is_setup(&server, true).await;
    mount_login(&server).await;

    cargo_bin_cmd!("certdesk")
        .env("CERTDESK_HOME", home.path())
        .args(["--server", server.uri().as_str(), "login", "--password", "hunter2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged in as admin"));

    assert!(session_path.exists(), "session.json should exist");
    let contents = std::fs::read_to_string(&session_path).unwrap();
    assert!(contents.contains("tok-cli"), "token should be stored");

    cargo_bin_cmd!("certdesk")
        .env("CERTDESK_HOME", home.path())
        .args(["--server", server.uri().as_str(), "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("logged in as admin"));

    cargo_bin_cmd!("certdesk")
        .env("CERTDESK_HOME", home.path())
        .args(["--server", server.uri().as_str(), "logout"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged out"));

    assert!(!session_path.exists(), "session.json should be removed");
}

/// Test: bad credentials fail with the recorded error and leave no session.
#[tokio::test(flavor = "multi_thread")]
async fn test_login_failure_reports_error() {
    let home = tempdir().unwrap();
    let server = MockServer::start().await;
    mount_is_setup(&server, true).await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"message": "wrong password"})),
        )
        .mount(&server)
        .await;

    cargo_bin_cmd!("certdesk")
        .env("CERTDESK_HOME", home.path())
        .args(["--server", server.uri().as_str(), "login", "--password", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("wrong password"));

    assert!(!home.path().join("session.json").exists());
}

/// Test: logout without a stored session prints a notice.
#[tokio::test(flavor = "multi_thread")]
async fn test_logout_without_session() {
    let home = tempdir().unwrap();
    let server = MockServer::start().await;

    cargo_bin_cmd!("certdesk")
        .env("CERTDESK_HOME", home.path())
        .args(["--server", server.uri().as_str(), "logout"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Not logged in"));
}

/// Test: navigating to a protected route while logged out redirects to the
/// login surface.
#[tokio::test(flavor = "multi_thread")]
async fn test_open_redirects_to_login_when_logged_out() {
    let home = tempdir().unwrap();
    let server = MockServer::start().await;
    mount_is_setup(&server, true).await;

    cargo_bin_cmd!("certdesk")
        .env("CERTDESK_HOME", home.path())
        .args(["--server", server.uri().as_str(), "open", "/overview"])
        .assert()
        .success()
        .stdout(predicate::str::contains("redirected to /login"));
}
