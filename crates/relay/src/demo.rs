// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Synthetic triage traffic for local development.
//!
//! Publishes a started/completed pair to one user's room on a fixed
//! interval so a locally running client has something to show.

use std::time::Duration;

use chrono::Utc;
use mp_core::ServerMessage;
use tracing::debug;

use crate::state::RelayState;

const CATEGORIES: [&str; 4] = ["urgent", "follow_up", "newsletter", "spam"];

/// Triage progress events for the `n`th synthetic email.
pub fn triage_pair(n: u64) -> (ServerMessage, ServerMessage) {
    let session_id = format!("demo-session-{}", n);
    let subject_ref = format!("demo-message-{}", n);
    let category = CATEGORIES[(n % CATEGORIES.len() as u64) as usize];

    let started = ServerMessage::TriageStarted {
        session_id: session_id.clone(),
        subject_ref: subject_ref.clone(),
        timestamp: Utc::now(),
    };
    let completed = ServerMessage::TriageCompleted {
        session_id,
        subject_ref,
        result: serde_json::json!({ "category": category }),
        timestamp: Utc::now(),
    };
    (started, completed)
}

/// Publish synthetic triage events to `user:{subject}` forever.
pub async fn run(state: RelayState, subject: String, interval: Duration) {
    let room = format!("user:{}", subject);
    let mut ticker = tokio::time::interval(interval);
    let mut n: u64 = 0;

    loop {
        ticker.tick().await;
        n += 1;
        let (started, completed) = triage_pair(n);
        let receivers = state.publish(room.clone(), started);
        state.publish(room.clone(), completed);
        debug!("published demo triage {} to {} ({} receivers)", n, room, receivers);
    }
}
