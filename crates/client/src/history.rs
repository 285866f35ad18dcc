// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded in-memory list of received triage events and notifications.

use std::collections::VecDeque;

use crate::event::Event;

/// What happens to the history when the connection drops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistoryPolicy {
    /// Keep everything across disconnects and reconnects.
    #[default]
    Retain,
    /// Start over whenever the connection ends.
    ClearOnDisconnect,
}

/// Most recent domain events, oldest first.
#[derive(Debug, Clone)]
pub struct NotificationHistory {
    entries: VecDeque<Event>,
    capacity: usize,
}

impl NotificationHistory {
    /// Create a history holding at most `capacity` events (0 disables it).
    pub fn new(capacity: usize) -> Self {
        NotificationHistory {
            entries: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
        }
    }

    /// Record an event if it is a domain event; evicts the oldest when full.
    ///
    /// Returns true if the event was recorded.
    pub fn record(&mut self, event: &Event) -> bool {
        if self.capacity == 0 || !event.kind().is_domain() {
            return false;
        }
        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(event.clone());
        true
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Copy of the recorded events, oldest first.
    pub fn snapshot(&self) -> Vec<Event> {
        self.entries.iter().cloned().collect()
    }
}
