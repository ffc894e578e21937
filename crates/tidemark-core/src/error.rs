//! Error types for Tidemark

use thiserror::Error;

use crate::{EntityId, EventTime};

/// Reconciliation errors raised by a store
///
/// Stale or duplicate events are not errors; they surface as
/// [`crate::ApplyOutcome::Stale`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReconcileError {
    #[error("Entity not found: {id}")]
    NotFound { id: EntityId },

    #[error("Entity {id} already exists: event time {event_time} vs watermark {watermark}")]
    Conflict {
        id: EntityId,
        event_time: EventTime,
        watermark: EventTime,
    },
}

/// Result type for store operations
pub type ReconcileResult<T> = Result<T, ReconcileError>;

/// Failure to parse an event kind from its wire name
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseKindError {
    #[error("Unknown event kind: {0}")]
    UnknownEventKind(String),
}
