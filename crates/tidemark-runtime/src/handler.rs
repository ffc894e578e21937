//! Event handlers
//!
//! One handler per event kind. A handler translates its typed event into a
//! single store call and passes the store's answer back unchanged; retrying
//! is the delivery pipeline's job.

use std::fmt;
use std::sync::Arc;

use tidemark_core::{
    ApplyOutcome, CreateEvent, DeleteEvent, EntityId, EventKind, EventTime, ReconcileResult,
    UpdateEvent,
};
use tidemark_state::ReconciliationStore;

/// Typed event accepted by a handler
pub trait HandledEvent: Clone + fmt::Debug + Send + Sync + 'static {
    fn entity_id(&self) -> &EntityId;
    fn event_time(&self) -> EventTime;
}

impl HandledEvent for CreateEvent {
    fn entity_id(&self) -> &EntityId {
        &self.id
    }

    fn event_time(&self) -> EventTime {
        self.time
    }
}

impl HandledEvent for UpdateEvent {
    fn entity_id(&self) -> &EntityId {
        &self.id
    }

    fn event_time(&self) -> EventTime {
        self.time
    }
}

impl HandledEvent for DeleteEvent {
    fn entity_id(&self) -> &EntityId {
        &self.id
    }

    fn event_time(&self) -> EventTime {
        self.time
    }
}

/// Apply one event of a single kind to a store
pub trait EventHandler: Send + Sync {
    type Event: HandledEvent;

    fn kind(&self) -> EventKind;

    fn handle(&self, event: &Self::Event) -> ReconcileResult<ApplyOutcome>;
}

/// Handles `Created` events
#[derive(Clone)]
pub struct CreateHandler {
    store: Arc<dyn ReconciliationStore>,
}

impl CreateHandler {
    pub fn new(store: Arc<dyn ReconciliationStore>) -> Self {
        CreateHandler { store }
    }
}

impl EventHandler for CreateHandler {
    type Event = CreateEvent;

    fn kind(&self) -> EventKind {
        EventKind::Created
    }

    fn handle(&self, event: &CreateEvent) -> ReconcileResult<ApplyOutcome> {
        self.store.create(&event.id, &event.payload, event.time)
    }
}

/// Handles `Updated` events
#[derive(Clone)]
pub struct UpdateHandler {
    store: Arc<dyn ReconciliationStore>,
}

impl UpdateHandler {
    pub fn new(store: Arc<dyn ReconciliationStore>) -> Self {
        UpdateHandler { store }
    }
}

impl EventHandler for UpdateHandler {
    type Event = UpdateEvent;

    fn kind(&self) -> EventKind {
        EventKind::Updated
    }

    fn handle(&self, event: &UpdateEvent) -> ReconcileResult<ApplyOutcome> {
        self.store.update(&event.id, &event.payload, event.time)
    }
}

/// Handles `Deleted` events
#[derive(Clone)]
pub struct DeleteHandler {
    store: Arc<dyn ReconciliationStore>,
}

impl DeleteHandler {
    pub fn new(store: Arc<dyn ReconciliationStore>) -> Self {
        DeleteHandler { store }
    }
}

impl EventHandler for DeleteHandler {
    type Event = DeleteEvent;

    fn kind(&self) -> EventKind {
        EventKind::Deleted
    }

    fn handle(&self, event: &DeleteEvent) -> ReconcileResult<ApplyOutcome> {
        self.store.delete(&event.id, event.time)
    }
}
