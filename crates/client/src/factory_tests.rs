// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for the client factory.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use super::auth::CredentialStore;
use super::client::ConnectionState;
use super::config::ClientConfig;
use super::factory::ClientFactory;
use super::transport_tests::MockConnector;

fn factory(connector: MockConnector) -> ClientFactory<MockConnector> {
    let credentials = Arc::new(CredentialStore::in_memory());
    credentials.set_credential("test-token").unwrap();
    ClientFactory::with_connector(
        ClientConfig::with_url("ws://relay.test/notifications"),
        credentials,
        connector,
    )
}

#[tokio::test(start_paused = true)]
async fn test_same_session_shares_one_connection() {
    let connector = MockConnector::new();
    let factory = factory(connector.clone());

    let first = factory.client("session-a");
    let second = factory.client("session-a");
    first.connect().await.unwrap();

    assert!(second.is_connected());
    second.connect().await.unwrap();
    assert_eq!(connector.opened(), 1);
    assert_eq!(factory.len(), 1);

    factory.shutdown();
}

#[tokio::test(start_paused = true)]
async fn test_sessions_are_independent() {
    let connector = MockConnector::new();
    let factory = factory(connector.clone());

    let a = factory.client("session-a");
    let b = factory.client("session-b");
    a.connect().await.unwrap();

    assert!(a.is_connected());
    assert_eq!(b.state(), ConnectionState::Disconnected);
    assert_eq!(factory.len(), 2);

    factory.shutdown();
}

#[tokio::test(start_paused = true)]
async fn test_remove_disconnects_client() {
    let connector = MockConnector::new();
    let factory = factory(connector.clone());

    let client = factory.client("session-a");
    client.connect().await.unwrap();

    assert!(factory.remove("session-a"));
    assert!(!factory.remove("session-a"));
    assert_eq!(client.state(), ConnectionState::Disconnected);
    assert!(factory.is_empty());

    let fresh = factory.client("session-a");
    assert_eq!(fresh.state(), ConnectionState::Disconnected);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_disconnects_everything() {
    let connector = MockConnector::new();
    let factory = factory(connector.clone());

    let a = factory.client("session-a");
    let b = factory.client("session-b");
    a.connect().await.unwrap();
    b.connect().await.unwrap();

    factory.shutdown();

    assert!(!a.is_connected());
    assert!(!b.is_connected());
    assert!(factory.is_empty());
}
