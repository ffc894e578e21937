//! Dead-letter sinks
//!
//! Events that exhaust their retry budget land here, one sink per event kind.
//! Sinks are append-only for the pipeline; an operator drains and replays.

use parking_lot::Mutex;
use tidemark_core::{CreateEvent, DeleteEvent, UpdateEvent};

/// Append-only queue of events whose delivery failed
#[derive(Debug)]
pub struct DeadLetterSink<E> {
    events: Mutex<Vec<E>>,
}

impl<E: Clone> DeadLetterSink<E> {
    pub fn new() -> Self {
        DeadLetterSink {
            events: Mutex::new(Vec::new()),
        }
    }

    pub fn push(&self, event: E) {
        self.events.lock().push(event);
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    /// Copy of the dead-lettered events, oldest first
    pub fn events(&self) -> Vec<E> {
        self.events.lock().clone()
    }

    /// Take every event out of the sink, oldest first
    pub fn drain(&self) -> Vec<E> {
        std::mem::take(&mut *self.events.lock())
    }
}

impl<E: Clone> Default for DeadLetterSink<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// The three per-kind dead-letter sinks
#[derive(Debug, Default)]
pub struct DeadLetterQueues {
    pub created: DeadLetterSink<CreateEvent>,
    pub updated: DeadLetterSink<UpdateEvent>,
    pub deleted: DeadLetterSink<DeleteEvent>,
}

impl DeadLetterQueues {
    pub fn new() -> Self {
        DeadLetterQueues::default()
    }

    /// Events across all sinks
    pub fn total(&self) -> usize {
        self.created.len() + self.updated.len() + self.deleted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}
