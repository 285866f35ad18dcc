// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for reconnect backoff.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use yare::parameterized;

use super::reconnect::{NextAttempt, ReconnectPolicy, ReconnectState};

#[parameterized(
    zero = { 0, 1000 },
    first = { 1, 1000 },
    second = { 2, 2000 },
    fifth = { 5, 5000 },
)]
fn test_delay_is_linear(attempt: u32, expected_ms: u64) {
    let policy = ReconnectPolicy::default();
    assert_eq!(policy.delay_for(attempt), Duration::from_millis(expected_ms));
}

#[test]
fn test_delay_saturates() {
    let policy = ReconnectPolicy {
        base_interval: Duration::MAX,
        max_attempts: 5,
    };
    assert_eq!(policy.delay_for(3), Duration::MAX);
}

#[test]
fn test_schedules_until_cap_then_exhausts_once() {
    let policy = ReconnectPolicy {
        base_interval: Duration::from_millis(100),
        max_attempts: 2,
    };
    let mut state = ReconnectState::default();

    for n in 1..=2u32 {
        let step = state.next(&policy);
        assert_eq!(
            step,
            NextAttempt::Schedule {
                attempt: n,
                delay: Duration::from_millis(100 * u64::from(n)),
            }
        );
        let timer = CancellationToken::new();
        state.arm(timer.clone());
        assert!(state.is_pending());
        assert!(state.fire(&timer));
    }

    assert_eq!(state.next(&policy), NextAttempt::Exhausted { attempts: 2 });
    assert_eq!(state.next(&policy), NextAttempt::Nothing);
}

#[test]
fn test_pending_timer_blocks_second_schedule() {
    let policy = ReconnectPolicy::default();
    let mut state = ReconnectState::default();

    assert!(matches!(state.next(&policy), NextAttempt::Schedule { .. }));
    state.arm(CancellationToken::new());

    assert_eq!(state.next(&policy), NextAttempt::Nothing);
    assert_eq!(state.attempts(), 1);
}

#[test]
fn test_cancelled_timer_does_not_fire() {
    let mut state = ReconnectState::default();
    let timer = CancellationToken::new();
    state.arm(timer.clone());

    state.cancel_timer();

    assert!(timer.is_cancelled());
    assert!(!state.fire(&timer));
    assert!(!state.is_pending());
}

#[test]
fn test_reset_clears_attempts_and_exhaustion() {
    let policy = ReconnectPolicy {
        base_interval: Duration::from_millis(10),
        max_attempts: 1,
    };
    let mut state = ReconnectState::default();
    let _ = state.next(&policy);
    assert_eq!(state.next(&policy), NextAttempt::Exhausted { attempts: 1 });

    let timer = CancellationToken::new();
    state.arm(timer.clone());
    state.reset();

    assert!(timer.is_cancelled());
    assert_eq!(state.attempts(), 0);
    assert!(matches!(state.next(&policy), NextAttempt::Schedule { attempt: 1, .. }));
}
