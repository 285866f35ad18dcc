// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! One-line rendering of client events for the terminal.

use chrono::{DateTime, Local, Utc};
use mp_client::{Event, EventKind, ServerMessage};

use crate::colors;

/// Tokens shorter than this are fully masked.
const REDACT_MIN_LEN: usize = 12;

/// Render an event as `TAG  detail`, coloring the tag when `color` is set.
pub fn format_line(event: &Event, color: bool) -> String {
    let kind = event.kind();
    let tag = format!("{:<20}", kind.as_str());
    let tag = if !color {
        tag
    } else if is_failure(kind) {
        colors::paint(colors::codes::ALERT, &tag)
    } else {
        colors::header(&tag)
    };

    match timestamp(event) {
        Some(ts) => {
            let ts = ts.with_timezone(&Local).format("%H:%M:%S").to_string();
            let ts = if color { colors::context(&ts) } else { ts };
            format!("{} {} {}", ts, tag, format_event(event))
        }
        None => format!("{:>8} {} {}", "", tag, format_event(event)),
    }
}

fn is_failure(kind: EventKind) -> bool {
    matches!(
        kind,
        EventKind::Error
            | EventKind::ReconnectExhausted
            | EventKind::TriageFailed
            | EventKind::ServerError
    )
}

fn timestamp(event: &Event) -> Option<DateTime<Utc>> {
    match event.server_message()? {
        ServerMessage::ConnectionAck { timestamp, .. }
        | ServerMessage::SubscriptionAck { timestamp, .. }
        | ServerMessage::TriageStarted { timestamp, .. }
        | ServerMessage::TriageCompleted { timestamp, .. }
        | ServerMessage::TriageFailed { timestamp, .. }
        | ServerMessage::Notification { timestamp, .. }
        | ServerMessage::StatusResponse { timestamp, .. } => Some(*timestamp),
        ServerMessage::Error { .. } => None,
    }
}

/// Human-readable detail of an event, without tag or timestamp.
pub fn format_event(event: &Event) -> String {
    match event {
        Event::Connected { client_id } => format!("connected as {}", client_id),
        Event::Disconnected { reason } => reason.to_string(),
        Event::Error { error } => error.to_string(),
        Event::ReconnectScheduled { attempt, delay } => {
            format!("attempt {} in {}ms", attempt, delay.as_millis())
        }
        Event::ReconnectExhausted { attempts } => {
            format!("gave up after {} attempts", attempts)
        }
        Event::Server(msg) => format_server_message(msg),
    }
}

fn format_server_message(msg: &ServerMessage) -> String {
    match msg {
        ServerMessage::ConnectionAck { message, .. } => message.clone(),
        ServerMessage::SubscriptionAck {
            subject_id, rooms, ..
        } => format!("{} ({})", subject_id, join_or_none(rooms)),
        ServerMessage::TriageStarted {
            subject_ref,
            session_id,
            ..
        } => format!("{} [{}]", subject_ref, session_id),
        ServerMessage::TriageCompleted {
            subject_ref,
            result,
            ..
        } => format!("{} -> {}", subject_ref, summarize_result(result)),
        ServerMessage::TriageFailed {
            subject_ref, error, ..
        } => format!("{}: {}", subject_ref, error),
        ServerMessage::Notification { kind, summary, .. } => format!("{}: {}", kind, summary),
        ServerMessage::StatusResponse {
            client_id,
            peer_count,
            rooms,
            ..
        } => format!(
            "{}, {} peer(s), rooms: {}",
            client_id,
            peer_count,
            join_or_none(rooms)
        ),
        ServerMessage::Error { message } => message.clone(),
    }
}

/// Show the category when the classifier reported one, the raw JSON otherwise.
pub fn summarize_result(result: &serde_json::Value) -> String {
    match result.get("category").and_then(|c| c.as_str()) {
        Some(category) => category.to_string(),
        None => result.to_string(),
    }
}

fn join_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "none".to_string()
    } else {
        items.join(", ")
    }
}

/// Mask all but the ends of a token.
pub fn redact_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() < REDACT_MIN_LEN {
        return "*".repeat(chars.len().max(4));
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

#[cfg(test)]
#[path = "display_tests.rs"]
mod tests;
