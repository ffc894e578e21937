//! Event definitions
//!
//! Lifecycle events are the only way entity state changes. Each event carries
//! the target id, its event time and, for Created/Updated, the new payload.
//! Delivery may be out of order, duplicated or concurrent.

use std::fmt;
use std::str::FromStr;

use crate::{EntityId, EventTime, ParseKindError, Payload};

/// Event kind classification
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventKind {
    Created,
    Updated,
    Deleted,
}

impl EventKind {
    pub const ALL: [EventKind; 3] = [EventKind::Created, EventKind::Updated, EventKind::Deleted];

    /// Wire name of the kind
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Created => "Created",
            EventKind::Updated => "Updated",
            EventKind::Deleted => "Deleted",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Created" => Ok(EventKind::Created),
            "Updated" => Ok(EventKind::Updated),
            "Deleted" => Ok(EventKind::Deleted),
            other => Err(ParseKindError::UnknownEventKind(other.to_string())),
        }
    }
}

/// Entity created at the source
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreateEvent {
    pub time: EventTime,
    pub id: EntityId,
    pub payload: Payload,
}

impl CreateEvent {
    pub fn new(id: impl Into<EntityId>, payload: Payload, time: EventTime) -> Self {
        CreateEvent {
            time,
            id: id.into(),
            payload,
        }
    }
}

/// Entity updated at the source
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UpdateEvent {
    pub time: EventTime,
    pub id: EntityId,
    pub payload: Payload,
}

impl UpdateEvent {
    pub fn new(id: impl Into<EntityId>, payload: Payload, time: EventTime) -> Self {
        UpdateEvent {
            time,
            id: id.into(),
            payload,
        }
    }
}

/// Entity deleted at the source
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeleteEvent {
    pub time: EventTime,
    pub id: EntityId,
}

impl DeleteEvent {
    pub fn new(id: impl Into<EntityId>, time: EventTime) -> Self {
        DeleteEvent {
            time,
            id: id.into(),
        }
    }
}

/// Lifecycle event - closed over the three kinds
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    Created(CreateEvent),
    Updated(UpdateEvent),
    Deleted(DeleteEvent),
}

impl Event {
    pub fn created(id: impl Into<EntityId>, name: impl Into<String>, time: EventTime) -> Self {
        Event::Created(CreateEvent::new(id, Payload::new(name), time))
    }

    pub fn updated(id: impl Into<EntityId>, name: impl Into<String>, time: EventTime) -> Self {
        Event::Updated(UpdateEvent::new(id, Payload::new(name), time))
    }

    pub fn deleted(id: impl Into<EntityId>, time: EventTime) -> Self {
        Event::Deleted(DeleteEvent::new(id, time))
    }

    pub fn kind(&self) -> EventKind {
        match self {
            Event::Created(_) => EventKind::Created,
            Event::Updated(_) => EventKind::Updated,
            Event::Deleted(_) => EventKind::Deleted,
        }
    }

    pub fn id(&self) -> &EntityId {
        match self {
            Event::Created(e) => &e.id,
            Event::Updated(e) => &e.id,
            Event::Deleted(e) => &e.id,
        }
    }

    pub fn time(&self) -> EventTime {
        match self {
            Event::Created(e) => e.time,
            Event::Updated(e) => e.time,
            Event::Deleted(e) => e.time,
        }
    }

    pub fn payload(&self) -> Option<&Payload> {
        match self {
            Event::Created(e) => Some(&e.payload),
            Event::Updated(e) => Some(&e.payload),
            Event::Deleted(_) => None,
        }
    }
}

impl From<CreateEvent> for Event {
    fn from(event: CreateEvent) -> Self {
        Event::Created(event)
    }
}

impl From<UpdateEvent> for Event {
    fn from(event: UpdateEvent) -> Self {
        Event::Updated(event)
    }
}

impl From<DeleteEvent> for Event {
    fn from(event: DeleteEvent) -> Self {
        Event::Deleted(event)
    }
}

/// Successful result of applying one event to a store
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ApplyOutcome {
    /// State changed
    Applied,
    /// Event was stale or a duplicate; state untouched
    Stale,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_kind_wire_names() {
        for kind in EventKind::ALL {
            let parsed: EventKind = kind.as_str().parse().unwrap();
            assert_eq!(parsed, kind);
        }

        let err = "Removed".parse::<EventKind>().unwrap_err();
        assert_eq!(err, ParseKindError::UnknownEventKind("Removed".to_string()));
    }

    #[test]
    fn test_event_accessors() {
        let t = EventTime::from_millis(7);
        let created = Event::created("1", "Added", t);
        let deleted = Event::deleted("1", t);

        assert_eq!(created.kind(), EventKind::Created);
        assert_eq!(created.id().as_str(), "1");
        assert_eq!(created.time(), t);
        assert_eq!(created.payload(), Some(&Payload::new("Added")));

        assert_eq!(deleted.kind(), EventKind::Deleted);
        assert!(deleted.payload().is_none());
    }

    #[test]
    fn test_event_from_variant() {
        let update = UpdateEvent::new("9", Payload::new("Updated"), EventTime::from_millis(3));
        let event: Event = update.clone().into();
        assert_eq!(event, Event::Updated(update));
    }
}
