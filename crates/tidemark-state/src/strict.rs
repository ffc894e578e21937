//! Strict reconciliation policy
//!
//! Create and update trust the caller's sequencing: a create on a live id is
//! always a conflict and an update always overwrites, even when it is older
//! than the data it replaces. Only delete compares against the watermark, so
//! a delete racing an update cannot destroy newer data.

use parking_lot::Mutex;
use tidemark_core::{
    ApplyOutcome, EntityId, EntityRecord, EventTime, Payload, ReconcileError, ReconcileResult,
};

use crate::{EntityField, PolicyKind, ReconciliationStore, Snapshot};

/// Store with the strict policy
#[derive(Debug, Default)]
pub struct StrictStore {
    field: Mutex<EntityField>,
}

impl StrictStore {
    pub fn new() -> Self {
        StrictStore::default()
    }
}

impl ReconciliationStore for StrictStore {
    fn policy(&self) -> PolicyKind {
        PolicyKind::Strict
    }

    fn create(
        &self,
        id: &EntityId,
        payload: &Payload,
        event_time: EventTime,
    ) -> ReconcileResult<ApplyOutcome> {
        let mut field = self.field.lock();

        if let Some(watermark) = field.watermark(id) {
            tracing::debug!(%id, ?event_time, ?watermark, "create rejected: entity is live");
            return Err(ReconcileError::Conflict {
                id: id.clone(),
                event_time,
                watermark,
            });
        }

        field.insert(EntityRecord::new(id.clone(), payload.clone(), event_time));
        tracing::trace!(%id, ?event_time, "entity created");
        Ok(ApplyOutcome::Applied)
    }

    fn update(
        &self,
        id: &EntityId,
        payload: &Payload,
        event_time: EventTime,
    ) -> ReconcileResult<ApplyOutcome> {
        let mut field = self.field.lock();

        let Some(record) = field.get_mut(id) else {
            tracing::debug!(%id, ?event_time, "update rejected: entity not found");
            return Err(ReconcileError::NotFound { id: id.clone() });
        };

        // Last applied wins; an older update moves the watermark back.
        if record.is_stale(event_time) {
            tracing::debug!(
                %id,
                ?event_time,
                watermark = ?record.watermark(),
                "applying update older than watermark"
            );
        }
        record.overwrite(payload.clone(), event_time);
        tracing::trace!(%id, ?event_time, "entity updated");
        Ok(ApplyOutcome::Applied)
    }

    fn delete(&self, id: &EntityId, event_time: EventTime) -> ReconcileResult<ApplyOutcome> {
        let mut field = self.field.lock();

        let Some(watermark) = field.watermark(id) else {
            tracing::debug!(%id, ?event_time, "delete rejected: entity not found");
            return Err(ReconcileError::NotFound { id: id.clone() });
        };

        if !event_time.is_after(watermark) {
            tracing::debug!(%id, ?event_time, ?watermark, "stale delete discarded");
            return Ok(ApplyOutcome::Stale);
        }

        field.remove(id);
        tracing::trace!(%id, ?event_time, "entity deleted");
        Ok(ApplyOutcome::Applied)
    }

    fn snapshot(&self) -> Snapshot {
        self.field.lock().snapshot()
    }

    fn watermark(&self, id: &EntityId) -> Option<EventTime> {
        self.field.lock().watermark(id)
    }

    fn len(&self) -> usize {
        self.field.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn t(millis: i64) -> EventTime {
        EventTime::from_millis(millis)
    }

    fn id() -> EntityId {
        EntityId::from("1")
    }

    #[test]
    fn test_create_on_live_id_conflicts_regardless_of_time() {
        let store = StrictStore::new();
        store.create(&id(), &Payload::new("Added1"), t(10)).unwrap();

        for time in [t(5), t(10), t(15)] {
            let err = store.create(&id(), &Payload::new("Added2"), time).unwrap_err();
            assert_eq!(
                err,
                ReconcileError::Conflict {
                    id: id(),
                    event_time: time,
                    watermark: t(10),
                }
            );
        }
        assert_eq!(store.snapshot()[&id()].payload.name, "Added1");
    }

    #[test]
    fn test_update_missing_entity_is_not_found() {
        let store = StrictStore::new();
        let err = store.update(&id(), &Payload::new("Updated"), t(10)).unwrap_err();
        assert_eq!(err, ReconcileError::NotFound { id: id() });
        assert!(store.is_empty());
    }

    #[test]
    fn test_update_older_than_watermark_still_overwrites() {
        let store = StrictStore::new();
        store.create(&id(), &Payload::new("Added"), t(10)).unwrap();
        store.update(&id(), &Payload::new("Updated2"), t(30)).unwrap();

        let outcome = store.update(&id(), &Payload::new("Updated1"), t(20)).unwrap();

        assert_eq!(outcome, ApplyOutcome::Applied);
        assert_eq!(store.snapshot()[&id()].payload.name, "Updated1");
        assert_eq!(store.watermark(&id()), Some(t(20)));
    }

    #[test]
    fn test_delete_is_time_guarded() {
        let store = StrictStore::new();
        store.create(&id(), &Payload::new("Added"), t(20)).unwrap();

        assert_eq!(store.delete(&id(), t(20)).unwrap(), ApplyOutcome::Stale);
        assert_eq!(store.delete(&id(), t(10)).unwrap(), ApplyOutcome::Stale);
        assert_eq!(store.len(), 1);

        assert_eq!(store.delete(&id(), t(30)).unwrap(), ApplyOutcome::Applied);
        assert!(store.is_empty());
        assert_eq!(store.watermark(&id()), None);
    }

    #[test]
    fn test_delete_missing_entity_is_not_found() {
        let store = StrictStore::new();
        let err = store.delete(&id(), t(10)).unwrap_err();
        assert_eq!(err, ReconcileError::NotFound { id: id() });
    }

    #[test]
    fn test_newer_create_then_older_create_and_delete() {
        // Added2 (t3), Added1 (t1), Removed (t2)
        let store = StrictStore::new();
        store.create(&id(), &Payload::new("Added2"), t(3)).unwrap();

        assert!(matches!(
            store.create(&id(), &Payload::new("Added1"), t(1)),
            Err(ReconcileError::Conflict { .. })
        ));
        assert_eq!(store.delete(&id(), t(2)).unwrap(), ApplyOutcome::Stale);

        let snapshot = store.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[&id()].payload.name, "Added2");
    }

    proptest! {
        #[test]
        fn prop_update_always_overwrites(
            created_at in 0i64..1_000,
            updates in proptest::collection::vec((0i64..1_000, "[a-z]{1,8}"), 1..20),
        ) {
            let store = StrictStore::new();
            store.create(&id(), &Payload::new("seed"), t(created_at)).unwrap();

            for (time, name) in &updates {
                let outcome = store.update(&id(), &Payload::new(name.clone()), t(*time)).unwrap();
                prop_assert_eq!(outcome, ApplyOutcome::Applied);

                let record = store.snapshot().remove(&id()).unwrap();
                prop_assert_eq!(&record.payload.name, name);
                prop_assert_eq!(record.last_event_time, t(*time));
            }
        }
    }
}
