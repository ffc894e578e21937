//! Entity records
//!
//! A record is the stored value of a live entity plus the event time of the
//! last event accepted for it (the watermark).

use crate::{EntityId, EventTime};

/// Entity payload - opaque to reconciliation, copied as-is
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Payload {
    pub name: String,
}

impl Payload {
    pub fn new(name: impl Into<String>) -> Self {
        Payload { name: name.into() }
    }
}

/// Entity record - value plus bookkeeping
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntityRecord {
    /// Stable external identity
    pub id: EntityId,
    /// Stored value
    pub payload: Payload,
    /// Event time of the last accepted event for this id
    pub last_event_time: EventTime,
}

impl EntityRecord {
    pub fn new(id: EntityId, payload: Payload, last_event_time: EventTime) -> Self {
        EntityRecord {
            id,
            payload,
            last_event_time,
        }
    }

    /// Threshold below (and at) which incoming events are stale
    #[inline]
    pub fn watermark(&self) -> EventTime {
        self.last_event_time
    }

    /// Replace the payload and move the watermark
    pub fn overwrite(&mut self, payload: Payload, event_time: EventTime) {
        self.payload = payload;
        self.last_event_time = event_time;
    }

    /// Check whether an event at `event_time` would be stale for this record
    #[inline]
    pub fn is_stale(&self, event_time: EventTime) -> bool {
        !event_time.is_after(self.last_event_time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_overwrite_moves_watermark() {
        let mut record = EntityRecord::new(
            EntityId::from("1"),
            Payload::new("Added"),
            EventTime::from_millis(10),
        );

        record.overwrite(Payload::new("Updated"), EventTime::from_millis(20));

        assert_eq!(record.payload.name, "Updated");
        assert_eq!(record.watermark(), EventTime::from_millis(20));
    }

    #[test]
    fn test_record_staleness_includes_equal_time() {
        let record = EntityRecord::new(
            EntityId::from("1"),
            Payload::new("Added"),
            EventTime::from_millis(10),
        );

        assert!(record.is_stale(EventTime::from_millis(9)));
        assert!(record.is_stale(EventTime::from_millis(10)));
        assert!(!record.is_stale(EventTime::from_millis(11)));
    }
}
