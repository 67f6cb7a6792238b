//! Account lockout state machine.
//!
//! The transitions here are pure functions over [`SecurityState`]; stores are
//! expected to run them inside a single atomic update (see
//! [`crate::store::UserStore::record_login_failure`]) so that concurrent
//! failed attempts against one account cannot lose increments.

use chrono::{DateTime, Duration, Utc};

use crate::user::SecurityState;

/// Thresholds governing the lockout state machine.
#[derive(Debug, Clone)]
pub struct LockoutPolicy {
    /// Consecutive failures that trip the lock.
    pub max_failed_attempts: u32,
    /// How long a tripped lock holds.
    pub lockout_duration: Duration,
}

impl Default for LockoutPolicy {
    fn default() -> Self {
        Self {
            max_failed_attempts: 5,
            lockout_duration: Duration::minutes(30),
        }
    }
}

/// Current lockout disposition of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockoutStatus {
    Unlocked,
    Locked { until: DateTime<Utc> },
}

/// Evaluate the lock **before** any password comparison: a locked account
/// fails immediately and the supplied password is never inspected.
pub fn check(security: &SecurityState, now: DateTime<Utc>) -> LockoutStatus {
    match security.lockout_until {
        Some(until) if security.account_locked && until > now => LockoutStatus::Locked { until },
        _ => LockoutStatus::Unlocked,
    }
}

/// Apply one failed attempt.
///
/// The first failure after an expired lock starts a **fresh count at 1**
/// rather than resuming the old one.
pub fn record_failure(security: &mut SecurityState, policy: &LockoutPolicy, now: DateTime<Utc>) {
    let lock_expired = security.account_locked
        && security.lockout_until.is_some_and(|until| until <= now);

    if lock_expired {
        security.account_locked = false;
        security.lockout_until = None;
        security.failed_login_attempts = 1;
    } else {
        security.failed_login_attempts += 1;
    }

    if security.failed_login_attempts >= policy.max_failed_attempts && !security.account_locked {
        security.account_locked = true;
        security.lockout_until = Some(now + policy.lockout_duration);
    }
}

/// Apply a successful login: counters clear and the lock releases.
pub fn record_success(security: &mut SecurityState, now: DateTime<Utc>, ip: Option<&str>) {
    security.failed_login_attempts = 0;
    security.account_locked = false;
    security.lockout_until = None;
    security.last_login = Some(now);
    security.last_login_ip = ip.map(str::to_string);
}
