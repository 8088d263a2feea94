//! Failed-login lockout state machine.
//!
//! The policy is a pure function of a `(failed_attempts, locked_until)`
//! snapshot and the current time. There is no background unlock job:
//! whether an account is locked is re-evaluated on every attempt.
//!
//! Persistence is out of scope here — the store applies the computed
//! transition as a single atomic conditional update so that concurrent
//! attempts against the same principal never lose a count.

use chrono::{DateTime, Duration, Utc};

/// Snapshot of a principal's lockout fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockoutState {
    pub failed_attempts: u32,
    pub locked_until: Option<DateTime<Utc>>,
}

impl LockoutState {
    /// Initial state at principal creation.
    pub fn initial() -> Self {
        Self {
            failed_attempts: 0,
            locked_until: None,
        }
    }
}

/// Lockout policy parameters.
#[derive(Debug, Clone, Copy)]
pub struct LockoutPolicy {
    /// Consecutive failures that trigger a lock.
    pub max_attempts: u32,
    /// How long a triggered lock lasts.
    pub lock_duration: Duration,
}

impl Default for LockoutPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            lock_duration: Duration::minutes(30),
        }
    }
}

impl LockoutPolicy {
    /// A principal is locked iff `locked_until` is strictly in the
    /// future. An attempt arriving exactly at expiry counts as
    /// unlocked.
    pub fn is_locked(&self, state: LockoutState, now: DateTime<Utc>) -> bool {
        state.locked_until.is_some_and(|until| until > now)
    }

    /// Minutes until the lock expires, rounded up. Zero when the
    /// principal is not locked.
    pub fn remaining_minutes(&self, state: LockoutState, now: DateTime<Utc>) -> i64 {
        match state.locked_until {
            Some(until) if until > now => {
                // ms is positive here, so plain ceiling math suffices.
                let ms = (until - now).num_milliseconds();
                (ms + 59_999) / 60_000
            }
            _ => 0,
        }
    }

    /// Transition applied when secret verification fails.
    ///
    /// An expired lock is cleared first and this failure restarts the
    /// count at 1. Otherwise the count increments, and reaching
    /// `max_attempts` activates a lock. The attempt that triggers the
    /// lock is itself still an invalid-credentials failure; only
    /// subsequent attempts are rejected as locked.
    pub fn on_failure(&self, state: LockoutState, now: DateTime<Utc>) -> LockoutState {
        let expired = state.locked_until.is_some_and(|until| until <= now);

        let (failed_attempts, previous_lock) = if expired {
            (1, None)
        } else {
            (state.failed_attempts + 1, state.locked_until)
        };

        let locked_until = if previous_lock.is_some() {
            // Already locked: keep the existing window, do not extend.
            previous_lock
        } else if failed_attempts >= self.max_attempts {
            Some(now + self.lock_duration)
        } else {
            None
        };

        LockoutState {
            failed_attempts,
            locked_until,
        }
    }

    /// Transition applied on successful verification. Only reachable
    /// when not locked; resets the machine to `UNLOCKED(0)`.
    pub fn on_success(&self) -> LockoutState {
        LockoutState::initial()
    }
}
