// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for relay state.

#![allow(clippy::unwrap_used)]

use mp_core::{ServerMessage, SubscriptionDescriptor};
use yare::parameterized;

use crate::state::RelayState;

#[parameterized(
    listed = { "alpha", true },
    unlisted = { "gamma", false },
    empty = { "", false },
)]
fn test_authorize_with_token_list(token: &str, expected: bool) {
    let state = RelayState::new(vec!["alpha".to_string(), "beta".to_string()]);
    assert_eq!(state.authorize(token), expected);
}

#[test]
fn test_open_relay_accepts_any_non_empty_token() {
    let state = RelayState::open();
    assert!(state.authorize("anything"));
    assert!(!state.authorize(""));
}

#[test]
fn test_client_ids_are_unique() {
    let state = RelayState::open();
    assert_eq!(state.next_client_id(), "client-1");
    assert_eq!(state.next_client_id(), "client-2");
}

#[test]
fn test_peer_guard_tracks_count() {
    let state = RelayState::open();
    let first = state.peer_joined();
    let second = state.peer_joined();
    assert_eq!(state.peer_count(), 2);

    drop(first);
    assert_eq!(state.peer_count(), 1);
    drop(second);
    assert_eq!(state.peer_count(), 0);
}

#[test]
fn test_publish_without_receivers() {
    let state = RelayState::open();
    assert_eq!(state.publish("user:1", ServerMessage::notification("t", "s")), 0);
}

#[tokio::test]
async fn test_publish_to_user_room() {
    let state = RelayState::open();
    let mut rx = state.subscribe();

    let receivers = state.publish_to(
        &SubscriptionDescriptor::new("user-5"),
        ServerMessage::notification("triage", "hello"),
    );

    assert_eq!(receivers, 1);
    let received = rx.recv().await.unwrap();
    assert_eq!(received.room, "user:user-5");
}

#[tokio::test]
async fn test_shutdown_signal() {
    let state = RelayState::open();
    let mut signal = state.shutdown_signal();
    assert!(!state.is_shut_down());

    state.shutdown();

    signal.changed().await.unwrap();
    assert!(*signal.borrow());
    assert!(state.is_shut_down());
}
