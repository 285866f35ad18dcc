// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

mod common;
use common::*;

/// `{"sub":"user-42","exp":4102444800}` with an unsigned header.
const JWT: &str = "eyJhbGciOiJub25lIn0.eyJzdWIiOiJ1c2VyLTQyIiwiZXhwIjo0MTAyNDQ0ODAwfQ.sig";

#[test]
fn set_writes_token_file() {
    let sandbox = Sandbox::new();

    sandbox
        .cmd()
        .args(["token", "set", "opaque-token-value"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Token saved to"));

    let stored = std::fs::read_to_string(sandbox.token_path()).unwrap();
    assert_eq!(stored.trim(), "opaque-token-value");
}

#[cfg(unix)]
#[test]
fn set_restricts_permissions() {
    use std::os::unix::fs::PermissionsExt;

    let sandbox = Sandbox::new();
    sandbox
        .cmd()
        .args(["token", "set", "opaque-token-value"])
        .assert()
        .success();

    let mode = std::fs::metadata(sandbox.token_path())
        .unwrap()
        .permissions()
        .mode();
    assert_eq!(mode & 0o777, 0o600);
}

#[test]
fn set_jwt_reports_subject() {
    let sandbox = Sandbox::new();

    sandbox
        .cmd()
        .args(["token", "set", JWT])
        .assert()
        .success()
        .stdout(predicate::str::contains("subject: user-42"));
}

#[test]
fn set_rejects_blank_token() {
    let sandbox = Sandbox::new();

    sandbox
        .cmd()
        .args(["token", "set", "   "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be empty"));

    assert!(!exists(&sandbox.token_path()));
}

#[test]
fn show_redacts_token() {
    let sandbox = Sandbox::new();
    sandbox.store_token(JWT);

    sandbox
        .cmd()
        .args(["token", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("token:   eyJh....sig"))
        .stdout(predicate::str::contains("subject: user-42"))
        .stdout(predicate::str::contains("expires: 2100-01-01 00:00:00 UTC"))
        .stdout(predicate::str::contains(JWT).not());
}

#[test]
fn show_prefers_environment_token() {
    let sandbox = Sandbox::new();
    sandbox.store_token("file-token-value");

    sandbox
        .cmd()
        .env("MAILPULSE_TOKEN", "environment-token")
        .args(["token", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("source:  MAILPULSE_TOKEN"))
        .stdout(predicate::str::contains("envi...oken"));
}

#[test]
fn show_without_token_fails() {
    let sandbox = Sandbox::new();

    sandbox
        .cmd()
        .args(["token", "show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no token stored"));
}

#[test]
fn clear_removes_token() {
    let sandbox = Sandbox::new();
    sandbox.store_token("opaque-token-value");

    sandbox
        .cmd()
        .args(["token", "clear"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Token removed"));

    assert!(!exists(&sandbox.token_path()));
    sandbox
        .cmd()
        .args(["token", "show"])
        .assert()
        .failure();
}

#[test]
fn clear_is_idempotent() {
    let sandbox = Sandbox::new();

    sandbox.cmd().args(["token", "clear"]).assert().success();
    sandbox.cmd().args(["token", "clear"]).assert().success();
}
