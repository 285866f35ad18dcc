// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! WebSocket protocol messages for client-relay communication.
//!
//! The protocol is simple:
//! - Client declares (or retracts) interest in a user's triage stream
//! - Server acknowledges the connection and subscriptions, then pushes
//!   triage progress and notifications to every connection in the room
//!
//! Every frame is a JSON object tagged by its `type` field.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which logical stream of events a connection wants routed to it.
///
/// `subject_id` is the user the stream belongs to; `channel_address`
/// narrows it to a single mailbox when a user has connected several.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct SubscriptionDescriptor {
    pub subject_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_address: Option<String>,
}

impl SubscriptionDescriptor {
    /// Creates a descriptor for every mailbox of a user.
    pub fn new(subject_id: impl Into<String>) -> Self {
        SubscriptionDescriptor {
            subject_id: subject_id.into(),
            channel_address: None,
        }
    }

    /// Narrows the descriptor to one mailbox address.
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.channel_address = Some(address.into());
        self
    }

    /// Room names the relay uses to route events for this descriptor.
    pub fn rooms(&self) -> Vec<String> {
        let mut rooms = vec![format!("user:{}", self.subject_id)];
        if let Some(ref address) = self.channel_address {
            rooms.push(format!("mailbox:{}", address));
        }
        rooms
    }
}

/// Messages sent from client to server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Declare interest in a stream.
    ///
    /// Replayed by the client after every reconnect.
    Subscribe(SubscriptionDescriptor),

    /// Retract previously declared interest.
    Unsubscribe(SubscriptionDescriptor),

    /// Ask the server to describe this connection.
    StatusRequest,

    /// Ask the server to push a test notification back.
    TestPing,
}

/// Messages sent from server to client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// First frame on every connection; completes the handshake.
    ConnectionAck {
        message: String,
        /// Server-generated identifier for this connection.
        client_id: String,
        timestamp: DateTime<Utc>,
    },

    /// Response to a Subscribe request.
    SubscriptionAck {
        message: String,
        subject_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        channel_address: Option<String>,
        /// Rooms this connection is now a member of.
        #[serde(default)]
        rooms: Vec<String>,
        timestamp: DateTime<Utc>,
    },

    /// Triage of one email has begun.
    TriageStarted {
        session_id: String,
        /// Reference to the email being triaged.
        subject_ref: String,
        timestamp: DateTime<Utc>,
    },

    /// Triage of one email finished with a classification.
    TriageCompleted {
        session_id: String,
        subject_ref: String,
        /// Classification result, passed through untouched.
        result: serde_json::Value,
        timestamp: DateTime<Utc>,
    },

    /// Triage of one email failed.
    TriageFailed {
        session_id: String,
        subject_ref: String,
        error: String,
        timestamp: DateTime<Utc>,
    },

    /// Free-form notification (test pings, watch renewals, ...).
    Notification {
        kind: String,
        summary: String,
        timestamp: DateTime<Utc>,
    },

    /// Response to a StatusRequest.
    StatusResponse {
        client_id: String,
        /// Connections currently attached to the server.
        peer_count: usize,
        rooms: Vec<String>,
        timestamp: DateTime<Utc>,
    },

    /// Error message.
    Error {
        /// Human-readable error description.
        message: String,
    },
}

impl ClientMessage {
    /// Creates a Subscribe message.
    pub fn subscribe(descriptor: SubscriptionDescriptor) -> Self {
        ClientMessage::Subscribe(descriptor)
    }

    /// Creates an Unsubscribe message.
    pub fn unsubscribe(descriptor: SubscriptionDescriptor) -> Self {
        ClientMessage::Unsubscribe(descriptor)
    }

    /// Creates a StatusRequest message.
    pub fn status_request() -> Self {
        ClientMessage::StatusRequest
    }

    /// Creates a TestPing message.
    pub fn test_ping() -> Self {
        ClientMessage::TestPing
    }

    /// Serializes the message to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes the message from JSON.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

impl ServerMessage {
    /// Creates a ConnectionAck message stamped now.
    pub fn connection_ack(client_id: impl Into<String>) -> Self {
        ServerMessage::ConnectionAck {
            message: "connected to notification relay".to_string(),
            client_id: client_id.into(),
            timestamp: Utc::now(),
        }
    }

    /// Creates a SubscriptionAck message for a descriptor stamped now.
    pub fn subscription_ack(descriptor: &SubscriptionDescriptor, rooms: Vec<String>) -> Self {
        ServerMessage::SubscriptionAck {
            message: format!("subscribed to notifications for {}", descriptor.subject_id),
            subject_id: descriptor.subject_id.clone(),
            channel_address: descriptor.channel_address.clone(),
            rooms,
            timestamp: Utc::now(),
        }
    }

    /// Creates a Notification message stamped now.
    pub fn notification(kind: impl Into<String>, summary: impl Into<String>) -> Self {
        ServerMessage::Notification {
            kind: kind.into(),
            summary: summary.into(),
            timestamp: Utc::now(),
        }
    }

    /// Creates an Error message.
    pub fn error(message: impl Into<String>) -> Self {
        ServerMessage::Error {
            message: message.into(),
        }
    }

    /// The `type` tag this message carries on the wire.
    pub fn tag(&self) -> &'static str {
        match self {
            ServerMessage::ConnectionAck { .. } => "connection_ack",
            ServerMessage::SubscriptionAck { .. } => "subscription_ack",
            ServerMessage::TriageStarted { .. } => "triage_started",
            ServerMessage::TriageCompleted { .. } => "triage_completed",
            ServerMessage::TriageFailed { .. } => "triage_failed",
            ServerMessage::Notification { .. } => "notification",
            ServerMessage::StatusResponse { .. } => "status_response",
            ServerMessage::Error { .. } => "error",
        }
    }

    /// Serializes the message to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes the message from JSON.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
