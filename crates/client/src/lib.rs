// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! mp-client: Real-time notification client for live email triage.
//!
//! Keeps one authenticated WebSocket connection to the notification relay,
//! declares interest in a user's triage stream and fans inbound events out
//! to registered listeners.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  NotificationClient  │────►│  Transport  │────►│    Relay    │
//! │ (connection manager) │◄────│   (trait)   │◄────│   Server    │
//! └──────────────────────┘     └─────────────┘     └─────────────┘
//!      │            │
//!      ▼            ▼
//! ┌──────────┐ ┌─────────────────┐
//! │Credential│ │ EventDispatcher │──► listeners
//! │  Store   │ │ (+ history)     │
//! └──────────┘ └─────────────────┘
//! ```
//!
//! # Features
//!
//! - Bearer token presented on every handshake, re-read on each attempt
//! - Connection state machine with a hard handshake timeout
//! - Automatic reconnect with linear backoff and an attempt cap
//! - Subscription replayed after every reconnect
//! - Listener panics isolated from each other and from the receive loop
//! - Injectable transport trait for testing

mod auth;
mod client;
mod config;
mod dispatch;
mod error;
mod event;
mod factory;
mod history;
mod reconnect;
mod transport;

pub use auth::CredentialStore;
pub use client::{ConnectionState, NotificationClient};
pub use config::ClientConfig;
pub use dispatch::{EventDispatcher, Listener, ListenerId};
pub use error::{ClientError, ClientResult, ConnectError};
pub use event::{DisconnectReason, Event, EventKind, UnknownEventKind};
pub use factory::ClientFactory;
pub use history::{HistoryPolicy, NotificationHistory};
pub use reconnect::ReconnectPolicy;
pub use transport::{
    Connector, Transport, TransportError, TransportResult, WebSocketConnector, WebSocketTransport,
};

pub use mp_core::{ClientMessage, Credential, ServerMessage, SubscriptionDescriptor};

#[cfg(test)]
mod test_helpers;






#[cfg(test)]
mod factory_tests;


#[cfg(test)]
mod reconnect_tests;
