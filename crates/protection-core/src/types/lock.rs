//! Lock decisions handed back to the protection manager.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which side of a pair a lock applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LockSide {
    #[serde(rename = "long")]
    Long,
    #[serde(rename = "short")]
    Short,
    /// Both directions.
    #[default]
    #[serde(rename = "*")]
    Any,
}

/// Outcome of a protection evaluation that asks for a lock.
///
/// Built fresh on every evaluation; persisting the lock is up to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockDecision {
    pub lock: bool,
    /// Time at which the lock expires.
    pub until: DateTime<Utc>,
    pub reason: String,
    #[serde(default)]
    pub lock_side: LockSide,
}

impl LockDecision {
    /// A lock on both sides until `until`.
    pub fn lock(until: DateTime<Utc>, reason: impl Into<String>) -> Self {
        Self {
            lock: true,
            until,
            reason: reason.into(),
            lock_side: LockSide::Any,
        }
    }
}
