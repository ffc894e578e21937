//! Delivery pipeline - bounded retry with dead-lettering
//!
//! Each delivery walks an explicit state machine:
//!
//! ```text
//! Pending -> Applying(1) -> Succeeded
//!                        -> Retrying(1) -> Applying(2) -> ... -> Retrying(n) -> DeadLettered
//! ```
//!
//! Every failed attempt waits out one back-off, the last one included, so an
//! event is dead-lettered only after the full interval following its final
//! failure. The back-off sleep is the only suspension point; the store call
//! inside `Applying` runs to completion without yielding.

use tidemark_core::{ApplyOutcome, EntityId, EventKind, EventTime, ReconcileError};

use crate::{DeadLetterSink, EventHandler, HandledEvent, RetryPolicy};

/// State of a single delivery
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeliveryState {
    /// Not yet attempted
    Pending,
    /// Handler invoked for the given attempt (1-based)
    Applying { attempt: u32 },
    /// Attempt failed; waiting out the back-off with `remaining` retries left.
    /// `remaining == 0` after the final attempt means dead-lettering follows.
    Retrying { attempt: u32, remaining: u32 },
    /// Handler returned success (applied or stale)
    Succeeded(ApplyOutcome),
    /// Retry budget exhausted; event pushed to the dead-letter sink
    DeadLettered,
}

impl DeliveryState {
    pub fn is_terminal(self) -> bool {
        matches!(self, DeliveryState::Succeeded(_) | DeliveryState::DeadLettered)
    }
}

/// Outcome of delivering one event
#[derive(Clone, Debug)]
pub struct DeliveryReport {
    pub kind: EventKind,
    pub id: EntityId,
    pub event_time: EventTime,
    /// Every state the delivery passed through, ending in a terminal one
    pub history: Vec<DeliveryState>,
    /// Handler invocations
    pub attempts: u32,
    /// Error of the most recent failed attempt
    pub last_error: Option<ReconcileError>,
}

impl DeliveryReport {
    /// Final state
    pub fn state(&self) -> DeliveryState {
        self.history
            .last()
            .copied()
            .unwrap_or(DeliveryState::Pending)
    }

    pub fn outcome(&self) -> Option<ApplyOutcome> {
        match self.state() {
            DeliveryState::Succeeded(outcome) => Some(outcome),
            _ => None,
        }
    }

    pub fn is_dead_lettered(&self) -> bool {
        self.state() == DeliveryState::DeadLettered
    }

    /// Retries performed (attempts after the first)
    pub fn retries(&self) -> u32 {
        self.attempts.saturating_sub(1)
    }
}

/// Deliver one event through `handler`, retrying per `policy`.
///
/// Failures are never returned to the caller: once the budget is spent the
/// event is appended to `sink` and the report says `DeadLettered`. Every
/// store error is treated the same way.
pub async fn deliver<H: EventHandler>(
    handler: &H,
    event: H::Event,
    sink: &DeadLetterSink<H::Event>,
    policy: &RetryPolicy,
) -> DeliveryReport {
    let mut report = DeliveryReport {
        kind: handler.kind(),
        id: event.entity_id().clone(),
        event_time: event.event_time(),
        history: vec![DeliveryState::Pending],
        attempts: 0,
        last_error: None,
    };
    let mut remaining = policy.max_retries;

    loop {
        report.attempts += 1;
        report.history.push(DeliveryState::Applying {
            attempt: report.attempts,
        });

        let err = match handler.handle(&event) {
            Ok(outcome) => {
                tracing::debug!(
                    kind = %report.kind,
                    id = %report.id,
                    attempt = report.attempts,
                    ?outcome,
                    "event delivered"
                );
                report.history.push(DeliveryState::Succeeded(outcome));
                return report;
            }
            Err(err) => err,
        };

        let exhausted = remaining == 0;
        remaining = remaining.saturating_sub(1);
        tracing::warn!(
            kind = %report.kind,
            id = %report.id,
            attempt = report.attempts,
            remaining,
            error = %err,
            "delivery failed, backing off"
        );
        report.last_error = Some(err);
        report.history.push(DeliveryState::Retrying {
            attempt: report.attempts,
            remaining,
        });

        tokio::time::sleep(policy.backoff).await;

        if exhausted {
            tracing::error!(
                kind = %report.kind,
                id = %report.id,
                attempts = report.attempts,
                error = ?report.last_error,
                "retries exhausted, event dead-lettered"
            );
            sink.push(event);
            report.history.push(DeliveryState::DeadLettered);
            return report;
        }
    }
}
