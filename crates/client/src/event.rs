// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Events delivered to listeners.
//!
//! Server-pushed messages and locally synthesized lifecycle events share one
//! enum so consumers have a single subscription surface for both.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use mp_core::ServerMessage;

use crate::error::ConnectError;

/// Why a connection ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisconnectReason {
    /// The consumer called `disconnect()`.
    ClientRequested,
    /// The server closed the connection.
    ServerClosed,
    /// The transport failed mid-session.
    TransportError(String),
}

impl DisconnectReason {
    /// Returns true if an automatic reconnect may follow.
    pub fn is_unplanned(&self) -> bool {
        !matches!(self, DisconnectReason::ClientRequested)
    }
}

impl fmt::Display for DisconnectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisconnectReason::ClientRequested => write!(f, "disconnected by client"),
            DisconnectReason::ServerClosed => write!(f, "connection closed by server"),
            DisconnectReason::TransportError(msg) => write!(f, "transport error: {}", msg),
        }
    }
}

/// An event delivered through the dispatcher.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Handshake completed.
    Connected { client_id: String },
    /// The connection ended.
    Disconnected { reason: DisconnectReason },
    /// A connect attempt failed.
    Error { error: ConnectError },
    /// A reconnect attempt will start after `delay`.
    ReconnectScheduled { attempt: u32, delay: Duration },
    /// The attempt cap was reached; no more automatic reconnects.
    ReconnectExhausted { attempts: u32 },
    /// A message pushed by the server, untouched.
    Server(ServerMessage),
}

impl Event {
    /// The tag listeners register under.
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Connected { .. } => EventKind::Connected,
            Event::Disconnected { .. } => EventKind::Disconnected,
            Event::Error { .. } => EventKind::Error,
            Event::ReconnectScheduled { .. } => EventKind::ReconnectScheduled,
            Event::ReconnectExhausted { .. } => EventKind::ReconnectExhausted,
            Event::Server(msg) => match msg {
                ServerMessage::ConnectionAck { .. } => EventKind::ConnectionAck,
                ServerMessage::SubscriptionAck { .. } => EventKind::SubscriptionAck,
                ServerMessage::TriageStarted { .. } => EventKind::TriageStarted,
                ServerMessage::TriageCompleted { .. } => EventKind::TriageCompleted,
                ServerMessage::TriageFailed { .. } => EventKind::TriageFailed,
                ServerMessage::Notification { .. } => EventKind::Notification,
                ServerMessage::StatusResponse { .. } => EventKind::StatusResponse,
                ServerMessage::Error { .. } => EventKind::ServerError,
            },
        }
    }

    /// Returns the server message, if this event carries one.
    pub fn server_message(&self) -> Option<&ServerMessage> {
        match self {
            Event::Server(msg) => Some(msg),
            _ => None,
        }
    }
}

impl From<ServerMessage> for Event {
    fn from(msg: ServerMessage) -> Self {
        Event::Server(msg)
    }
}

/// Discriminant tag of an [`Event`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventKind {
    Connected,
    Disconnected,
    Error,
    ReconnectScheduled,
    ReconnectExhausted,
    ConnectionAck,
    SubscriptionAck,
    TriageStarted,
    TriageCompleted,
    TriageFailed,
    Notification,
    StatusResponse,
    ServerError,
}

impl EventKind {
    pub const ALL: [EventKind; 13] = [
        EventKind::Connected,
        EventKind::Disconnected,
        EventKind::Error,
        EventKind::ReconnectScheduled,
        EventKind::ReconnectExhausted,
        EventKind::ConnectionAck,
        EventKind::SubscriptionAck,
        EventKind::TriageStarted,
        EventKind::TriageCompleted,
        EventKind::TriageFailed,
        EventKind::Notification,
        EventKind::StatusResponse,
        EventKind::ServerError,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Connected => "connected",
            EventKind::Disconnected => "disconnected",
            EventKind::Error => "error",
            EventKind::ReconnectScheduled => "reconnect_scheduled",
            EventKind::ReconnectExhausted => "reconnect_exhausted",
            EventKind::ConnectionAck => "connection_ack",
            EventKind::SubscriptionAck => "subscription_ack",
            EventKind::TriageStarted => "triage_started",
            EventKind::TriageCompleted => "triage_completed",
            EventKind::TriageFailed => "triage_failed",
            EventKind::Notification => "notification",
            EventKind::StatusResponse => "status_response",
            EventKind::ServerError => "server_error",
        }
    }

    /// Lifecycle kinds are synthesized locally, never sent by the server.
    pub fn is_lifecycle(&self) -> bool {
        matches!(
            self,
            EventKind::Connected
                | EventKind::Disconnected
                | EventKind::Error
                | EventKind::ReconnectScheduled
                | EventKind::ReconnectExhausted
        )
    }

    /// Kinds kept in the notification history.
    pub fn is_domain(&self) -> bool {
        matches!(
            self,
            EventKind::TriageStarted
                | EventKind::TriageCompleted
                | EventKind::TriageFailed
                | EventKind::Notification
        )
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when parsing an unrecognized event tag.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown event type: '{0}'")]
pub struct UnknownEventKind(pub String);

impl FromStr for EventKind {
    type Err = UnknownEventKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().replace('-', "_").to_ascii_lowercase();
        EventKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| UnknownEventKind(s.to_string()))
    }
}
