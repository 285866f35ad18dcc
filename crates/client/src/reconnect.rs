// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Reconnect backoff policy and bookkeeping.
//!
//! The delay before attempt N (1-indexed) is `base_interval * N`: linear,
//! not exponential. After `max_attempts` scheduled attempts the client gives
//! up and reports exhaustion once.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

/// Linear backoff with an attempt cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub base_interval: Duration,
    pub max_attempts: u32,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        ReconnectPolicy {
            base_interval: Duration::from_millis(1000),
            max_attempts: 5,
        }
    }
}

impl ReconnectPolicy {
    /// Delay before the given 1-indexed attempt.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_interval.saturating_mul(attempt.max(1))
    }
}

/// What the scheduler should do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NextAttempt {
    /// Schedule this attempt after this delay.
    Schedule { attempt: u32, delay: Duration },
    /// The cap was just reached.
    Exhausted { attempts: u32 },
    /// A timer is already pending, or exhaustion was already reported.
    Nothing,
}

/// Attempt counter plus the pending timer, if any.
#[derive(Debug, Default)]
pub(crate) struct ReconnectState {
    attempts: u32,
    timer: Option<CancellationToken>,
    exhausted: bool,
}

impl ReconnectState {
    pub(crate) fn attempts(&self) -> u32 {
        self.attempts
    }

    pub(crate) fn is_pending(&self) -> bool {
        self.timer.is_some()
    }

    /// Decide the next step and, when scheduling, count the attempt.
    pub(crate) fn next(&mut self, policy: &ReconnectPolicy) -> NextAttempt {
        if self.timer.is_some() || self.exhausted {
            return NextAttempt::Nothing;
        }
        if self.attempts >= policy.max_attempts {
            self.exhausted = true;
            return NextAttempt::Exhausted {
                attempts: self.attempts,
            };
        }
        self.attempts += 1;
        NextAttempt::Schedule {
            attempt: self.attempts,
            delay: policy.delay_for(self.attempts),
        }
    }

    /// Remember the timer for a scheduled attempt.
    pub(crate) fn arm(&mut self, token: CancellationToken) {
        self.timer = Some(token);
    }

    /// Consume the timer when it fires. Returns false if it was cancelled.
    pub(crate) fn fire(&mut self, token: &CancellationToken) -> bool {
        if token.is_cancelled() {
            return false;
        }
        self.timer = None;
        true
    }

    pub(crate) fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.cancel();
        }
    }

    /// Cancel the timer and start counting from zero.
    pub(crate) fn reset(&mut self) {
        self.cancel_timer();
        self.attempts = 0;
        self.exhausted = false;
    }
}
