// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use mp_client::{ConnectError, DisconnectReason, SubscriptionDescriptor};
use serde_json::json;
use yare::parameterized;

use super::*;

fn triage_completed(result: serde_json::Value) -> Event {
    Event::Server(ServerMessage::TriageCompleted {
        session_id: "s-1".to_string(),
        subject_ref: "msg-9".to_string(),
        result,
        timestamp: Utc::now(),
    })
}

#[parameterized(
    connected = { Event::Connected { client_id: "client-3".to_string() }, "connected as client-3" },
    server_closed = {
        Event::Disconnected { reason: DisconnectReason::ServerClosed },
        "connection closed by server"
    },
    scheduled = {
        Event::ReconnectScheduled { attempt: 2, delay: Duration::from_millis(2000) },
        "attempt 2 in 2000ms"
    },
    exhausted = { Event::ReconnectExhausted { attempts: 5 }, "gave up after 5 attempts" },
    rejected = {
        Event::Error { error: ConnectError::AuthenticationRejected("bad token".to_string()) },
        "authentication rejected: bad token"
    },
    server_error = { Event::Server(ServerMessage::error("quota exceeded")), "quota exceeded" },
)]
fn test_format_event(event: Event, expected: &str) {
    assert_eq!(format_event(&event), expected);
}

#[test]
fn test_subscription_ack_lists_rooms() {
    let descriptor = SubscriptionDescriptor::new("user-7").with_address("ops@example.com");
    let event = Event::Server(ServerMessage::subscription_ack(
        &descriptor,
        descriptor.rooms(),
    ));

    assert_eq!(
        format_event(&event),
        "user-7 (user:user-7, mailbox:ops@example.com)"
    );
}

#[test]
fn test_triage_completed_shows_category() {
    let event = triage_completed(json!({ "category": "urgent", "score": 0.9 }));
    assert_eq!(format_event(&event), "msg-9 -> urgent");
}

#[test]
fn test_triage_completed_without_category_shows_json() {
    let event = triage_completed(json!({ "labels": ["a"] }));
    assert_eq!(format_event(&event), r#"msg-9 -> {"labels":["a"]}"#);
}

#[test]
fn test_plain_line_has_tag_and_detail() {
    let event = Event::Server(ServerMessage::notification("test", "hello"));

    let line = format_line(&event, false);

    assert!(!line.contains('\x1b'));
    assert!(line.contains("notification"));
    assert!(line.ends_with("test: hello"));
}

#[test]
fn test_lifecycle_line_has_no_timestamp() {
    let line = format_line(&Event::ReconnectExhausted { attempts: 1 }, false);
    assert!(line.starts_with("         reconnect_exhausted"));
}

#[test]
fn test_colored_failure_uses_alert_color() {
    let line = format_line(&Event::ReconnectExhausted { attempts: 1 }, true);
    assert!(line.contains("\x1b[38;5;167m"));
}

#[parameterized(
    short = { "abc", "****" },
    eleven = { "abcdefghijk", "***********" },
    jwt_like = { "eyJhbGciOiJub25lIn0.e30.sig", "eyJh....sig" },
)]
fn test_redact_token(token: &str, expected: &str) {
    assert_eq!(redact_token(token), expected);
}
