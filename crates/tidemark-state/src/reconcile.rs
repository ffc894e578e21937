//! Reconciliation store contract and policy selection

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use thiserror::Error;
use tidemark_core::{ApplyOutcome, EntityId, EventTime, Payload, ReconcileResult};

use crate::{Snapshot, StrictStore, TolerantStore};

/// Entity store that resolves create/update/delete events for the same id.
///
/// Every operation is evaluated immediately against current state and runs
/// to completion under the store's lock. Implementations must not suspend
/// (or call back out) while holding it, so concurrent deliveries can share
/// one store without observing a half-applied mutation.
pub trait ReconciliationStore: Send + Sync {
    /// Policy implemented by this store
    fn policy(&self) -> PolicyKind;

    /// Apply a create event
    fn create(
        &self,
        id: &EntityId,
        payload: &Payload,
        event_time: EventTime,
    ) -> ReconcileResult<ApplyOutcome>;

    /// Apply an update event
    fn update(
        &self,
        id: &EntityId,
        payload: &Payload,
        event_time: EventTime,
    ) -> ReconcileResult<ApplyOutcome>;

    /// Apply a delete event
    fn delete(&self, id: &EntityId, event_time: EventTime) -> ReconcileResult<ApplyOutcome>;

    /// Copy of the live map
    fn snapshot(&self) -> Snapshot;

    /// Watermark of a live id
    fn watermark(&self, id: &EntityId) -> Option<EventTime>;

    /// Number of live entities
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Conflict-resolution policy
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum PolicyKind {
    /// Create/update trust caller sequencing; only delete is time-guarded
    Strict,
    /// Every mutation at or below the watermark is discarded as stale
    #[default]
    TimeTolerant,
}

impl PolicyKind {
    pub const ALL: [PolicyKind; 2] = [PolicyKind::Strict, PolicyKind::TimeTolerant];

    pub fn as_str(self) -> &'static str {
        match self {
            PolicyKind::Strict => "strict",
            PolicyKind::TimeTolerant => "time-tolerant",
        }
    }

    /// Build an empty store for this policy
    pub fn build(self) -> Arc<dyn ReconciliationStore> {
        match self {
            PolicyKind::Strict => Arc::new(StrictStore::new()),
            PolicyKind::TimeTolerant => Arc::new(TolerantStore::new()),
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown policy name
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown reconciliation policy: {0}")]
pub struct ParsePolicyError(pub String);

impl FromStr for PolicyKind {
    type Err = ParsePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(PolicyKind::Strict),
            "time-tolerant" | "tolerant" => Ok(PolicyKind::TimeTolerant),
            other => Err(ParsePolicyError(other.to_string())),
        }
    }
}
