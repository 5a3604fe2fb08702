//! Advisory draft locking rules.
//!
//! A draft carries `(locked_by, locked_at)` on its row. The lock is a
//! convention between well-behaved admin clients, not a store-level lock:
//! the per-row update is the atomic boundary. Locks expire 60 seconds after
//! the last successful acquisition.

use chrono::Duration;
use serde::Serialize;

use crate::error::CoreError;
use crate::types::Timestamp;

/// Seconds after which an unrefreshed lock no longer blocks other editors.
pub const LOCK_TIMEOUT_SECS: i64 = 60;

/// Result codes of a lock-draft request, as returned to the admin UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "i32")]
pub enum LockDraftResult {
    /// The caller now holds the lock.
    Locked = 0,
    /// Another editor holds an unexpired lock.
    LockedByOther = 1,
    /// Editing is blocked until pending database migrations are applied.
    PendingMigrations = 2,
}

impl From<LockDraftResult> for i32 {
    fn from(value: LockDraftResult) -> Self {
        value as i32
    }
}

/// Pure lock-acquisition decision over the stored lock fields.
///
/// Returns `Ok(true)` when `user` may take (or keep) the lock: the draft is
/// unlocked, the caller already owns the lock (re-entrant; refreshes the
/// timestamp), or the existing lock has expired. Returns `Ok(false)` when
/// another editor's unexpired lock stands; the stored state must not be
/// touched in that case. An empty `user` is a contract violation.
pub fn may_acquire(
    locked_by: &str,
    locked_at: Option<Timestamp>,
    user: &str,
    now: Timestamp,
) -> Result<bool, CoreError> {
    if user.is_empty() {
        return Err(CoreError::InvalidArgument(
            "lock owner must not be empty".into(),
        ));
    }
    if locked_by.is_empty() || locked_by == user {
        return Ok(true);
    }
    Ok(is_expired(locked_at, now))
}

/// A lock with no timestamp, or one older than [`LOCK_TIMEOUT_SECS`], is
/// expired.
pub fn is_expired(locked_at: Option<Timestamp>, now: Timestamp) -> bool {
    match locked_at {
        Some(at) => at + Duration::seconds(LOCK_TIMEOUT_SECS) < now,
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::{TimeZone, Utc};

    fn t0() -> Timestamp {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_empty_user_is_invalid() {
        assert_matches!(
            may_acquire("", None, "", t0()),
            Err(CoreError::InvalidArgument(_))
        );
    }

    #[test]
    fn test_unlocked_draft_is_acquirable() {
        assert!(may_acquire("", None, "alice", t0()).unwrap());
    }

    #[test]
    fn test_reentrant_acquire_by_owner() {
        assert!(may_acquire("alice", Some(t0()), "alice", t0()).unwrap());
    }

    #[test]
    fn test_other_user_blocked_inside_window() {
        let now = t0() + Duration::seconds(30);
        assert!(!may_acquire("alice", Some(t0()), "bob", now).unwrap());
    }

    #[test]
    fn test_other_user_acquires_after_expiry() {
        let now = t0() + Duration::seconds(61);
        assert!(may_acquire("alice", Some(t0()), "bob", now).unwrap());
    }

    #[test]
    fn test_exactly_at_timeout_is_not_expired() {
        // Expiry requires locked_at + 60s < now, strictly.
        let now = t0() + Duration::seconds(LOCK_TIMEOUT_SECS);
        assert!(!may_acquire("alice", Some(t0()), "bob", now).unwrap());
    }

    #[test]
    fn test_lock_without_timestamp_counts_as_expired() {
        assert!(may_acquire("alice", None, "bob", t0()).unwrap());
    }

    #[test]
    fn test_result_codes() {
        assert_eq!(i32::from(LockDraftResult::Locked), 0);
        assert_eq!(i32::from(LockDraftResult::LockedByOther), 1);
        assert_eq!(i32::from(LockDraftResult::PendingMigrations), 2);
    }
}
