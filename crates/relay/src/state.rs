// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Relay state management.
//!
//! Holds the accepted tokens, the room broadcast channel and connection
//! counters shared by every connection task.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use mp_core::{ServerMessage, SubscriptionDescriptor};
use tokio::sync::{broadcast, watch};

/// An event addressed to the members of one room.
#[derive(Debug, Clone)]
pub struct RoomMessage {
    pub room: String,
    pub message: ServerMessage,
}

/// Shared relay state.
#[derive(Clone)]
pub struct RelayState {
    inner: Arc<RelayStateInner>,
}

struct RelayStateInner {
    /// Accepted bearer tokens. Empty means any non-empty token is accepted.
    tokens: HashSet<String>,
    /// Broadcast channel for room fanout.
    broadcast_tx: broadcast::Sender<RoomMessage>,
    /// Connections currently attached.
    peers: AtomicUsize,
    next_client: AtomicU64,
    /// Flips to true once when the relay shuts down.
    shutdown_tx: watch::Sender<bool>,
}

impl RelayState {
    /// Creates a relay accepting only the given tokens.
    pub fn new(tokens: impl IntoIterator<Item = String>) -> Self {
        let (broadcast_tx, _) = broadcast::channel(1024);
        let (shutdown_tx, _) = watch::channel(false);

        RelayState {
            inner: Arc::new(RelayStateInner {
                tokens: tokens.into_iter().collect(),
                broadcast_tx,
                peers: AtomicUsize::new(0),
                next_client: AtomicU64::new(1),
                shutdown_tx,
            }),
        }
    }

    /// Creates a relay accepting any non-empty token.
    pub fn open() -> Self {
        Self::new(Vec::new())
    }

    /// Returns true if `token` may connect.
    pub fn authorize(&self, token: &str) -> bool {
        if token.is_empty() {
            return false;
        }
        self.inner.tokens.is_empty() || self.inner.tokens.contains(token)
    }

    /// Publishes an event to every member of `room`.
    ///
    /// Returns the number of connections that will inspect it.
    pub fn publish(&self, room: impl Into<String>, message: ServerMessage) -> usize {
        let room_message = RoomMessage {
            room: room.into(),
            message,
        };
        self.inner.broadcast_tx.send(room_message).unwrap_or(0)
    }

    /// Publishes an event to the user room of `descriptor`.
    pub fn publish_to(&self, descriptor: &SubscriptionDescriptor, message: ServerMessage) -> usize {
        self.publish(format!("user:{}", descriptor.subject_id), message)
    }

    /// Subscribe to room broadcasts.
    pub fn subscribe(&self) -> broadcast::Receiver<RoomMessage> {
        self.inner.broadcast_tx.subscribe()
    }

    /// Allocates an identifier for a new connection.
    pub fn next_client_id(&self) -> String {
        let n = self.inner.next_client.fetch_add(1, Ordering::Relaxed);
        format!("client-{}", n)
    }

    /// Counts a connection until the returned guard is dropped.
    pub fn peer_joined(&self) -> PeerGuard {
        self.inner.peers.fetch_add(1, Ordering::SeqCst);
        PeerGuard {
            state: self.clone(),
        }
    }

    pub fn peer_count(&self) -> usize {
        self.inner.peers.load(Ordering::SeqCst)
    }

    /// Stop accepting and close every open connection.
    pub fn shutdown(&self) {
        self.inner.shutdown_tx.send_replace(true);
    }

    pub fn is_shut_down(&self) -> bool {
        *self.inner.shutdown_tx.borrow()
    }

    /// Receiver observing the shutdown flag.
    pub fn shutdown_signal(&self) -> watch::Receiver<bool> {
        self.inner.shutdown_tx.subscribe()
    }
}

/// Decrements the peer count on drop.
pub struct PeerGuard {
    state: RelayState,
}

impl Drop for PeerGuard {
    fn drop(&mut self) {
        self.state.inner.peers.fetch_sub(1, Ordering::SeqCst);
    }
}
