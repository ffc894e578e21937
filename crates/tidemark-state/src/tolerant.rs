//! Time-tolerant reconciliation policy
//!
//! Every mutation is guarded by one rule: an event whose time does not exceed
//! the entity's watermark is a stale duplicate and is discarded without error.
//! Update and delete become idempotent under at-least-once, out-of-order
//! delivery.
//!
//! Create stays special. Without tombstones a genuinely new create after a
//! delete looks exactly like a stale create, so a create on a live id is
//! treated as stale unless it is strictly newer, in which case it is surfaced
//! as a conflict instead of silently overwriting live data.

use parking_lot::Mutex;
use tidemark_core::{
    ApplyOutcome, EntityId, EntityRecord, EventTime, Payload, ReconcileError, ReconcileResult,
};

use crate::{EntityField, PolicyKind, ReconciliationStore, Snapshot};

/// Store with the time-tolerant policy
#[derive(Debug, Default)]
pub struct TolerantStore {
    field: Mutex<EntityField>,
}

impl TolerantStore {
    pub fn new() -> Self {
        TolerantStore::default()
    }
}

impl ReconciliationStore for TolerantStore {
    fn policy(&self) -> PolicyKind {
        PolicyKind::TimeTolerant
    }

    fn create(
        &self,
        id: &EntityId,
        payload: &Payload,
        event_time: EventTime,
    ) -> ReconcileResult<ApplyOutcome> {
        let mut field = self.field.lock();

        match field.watermark(id) {
            None => {
                field.insert(EntityRecord::new(id.clone(), payload.clone(), event_time));
                tracing::trace!(%id, ?event_time, "entity created");
                Ok(ApplyOutcome::Applied)
            }
            Some(watermark) if !event_time.is_after(watermark) => {
                tracing::debug!(%id, ?event_time, ?watermark, "stale create discarded");
                Ok(ApplyOutcome::Stale)
            }
            Some(watermark) => {
                tracing::debug!(
                    %id,
                    ?event_time,
                    ?watermark,
                    "create rejected: newer create for live entity"
                );
                Err(ReconcileError::Conflict {
                    id: id.clone(),
                    event_time,
                    watermark,
                })
            }
        }
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

        if record.is_stale(event_time) {
            tracing::debug!(
                %id,
                ?event_time,
                watermark = ?record.watermark(),
                "stale update discarded"
            );
            return Ok(ApplyOutcome::Stale);
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
    fn test_create_on_live_id() {
        let store = TolerantStore::new();
        store.create(&id(), &Payload::new("Added"), t(10)).unwrap();

        // Older or equal: stale
        assert_eq!(
            store.create(&id(), &Payload::new("Old"), t(5)).unwrap(),
            ApplyOutcome::Stale
        );
        assert_eq!(
            store.create(&id(), &Payload::new("Dup"), t(10)).unwrap(),
            ApplyOutcome::Stale
        );

        // Newer: conflict
        let err = store.create(&id(), &Payload::new("New"), t(11)).unwrap_err();
        assert_eq!(
            err,
            ReconcileError::Conflict {
                id: id(),
                event_time: t(11),
                watermark: t(10),
            }
        );
        assert_eq!(store.snapshot()[&id()].payload.name, "Added");
    }

    #[test]
    fn test_update_guarded_by_watermark() {
        let store = TolerantStore::new();
        store.create(&id(), &Payload::new("Added"), t(10)).unwrap();

        assert_eq!(
            store.update(&id(), &Payload::new("Updated2"), t(30)).unwrap(),
            ApplyOutcome::Applied
        );
        assert_eq!(
            store.update(&id(), &Payload::new("Updated1"), t(20)).unwrap(),
            ApplyOutcome::Stale
        );

        let record = store.snapshot().remove(&id()).unwrap();
        assert_eq!(record.payload.name, "Updated2");
        assert_eq!(record.last_event_time, t(30));
    }

    #[test]
    fn test_missing_entity_is_not_found() {
        let store = TolerantStore::new();
        assert_eq!(
            store.update(&id(), &Payload::new("Updated"), t(1)).unwrap_err(),
            ReconcileError::NotFound { id: id() }
        );
        assert_eq!(
            store.delete(&id(), t(1)).unwrap_err(),
            ReconcileError::NotFound { id: id() }
        );
    }

    #[test]
    fn test_newer_create_then_older_create_and_delete() {
        // Added2 (t3), Added1 (t1), Removed (t2): both late events are stale
        let store = TolerantStore::new();
        store.create(&id(), &Payload::new("Added2"), t(3)).unwrap();

        assert_eq!(
            store.create(&id(), &Payload::new("Added1"), t(1)).unwrap(),
            ApplyOutcome::Stale
        );
        assert_eq!(store.delete(&id(), t(2)).unwrap(), ApplyOutcome::Stale);

        let snapshot = store.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[&id()].payload.name, "Added2");
        assert_eq!(snapshot[&id()].last_event_time, t(3));
    }

    #[test]
    fn test_create_after_delete_ignores_old_watermark() {
        let store = TolerantStore::new();
        store.create(&id(), &Payload::new("Added"), t(10)).unwrap();
        store.update(&id(), &Payload::new("Updated"), t(50)).unwrap();
        store.delete(&id(), t(60)).unwrap();

        // Older than the deleted record's watermark, still accepted
        assert_eq!(
            store.create(&id(), &Payload::new("Again"), t(1)).unwrap(),
            ApplyOutcome::Applied
        );
        assert_eq!(store.watermark(&id()), Some(t(1)));
    }

    #[derive(Clone, Debug)]
    enum Op {
        Update(i64),
        Delete(i64),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0i64..1_000).prop_map(Op::Update),
            (0i64..1_000).prop_map(Op::Delete),
        ]
    }

    proptest! {
        #[test]
        fn prop_stale_events_leave_record_untouched(
            watermark in 0i64..1_000,
            offsets in proptest::collection::vec(0i64..1_000, 1..20),
            deletes in proptest::collection::vec(any::<bool>(), 20),
        ) {
            let store = TolerantStore::new();
            store.create(&id(), &Payload::new("Added"), t(watermark)).unwrap();
            let before = store.snapshot();

            for (offset, is_delete) in offsets.iter().zip(deletes) {
                let time = t(watermark - offset);
                let outcome = if is_delete {
                    store.delete(&id(), time).unwrap()
                } else {
                    store.update(&id(), &Payload::new("Late"), time).unwrap()
                };
                prop_assert_eq!(outcome, ApplyOutcome::Stale);
            }

            prop_assert_eq!(store.snapshot(), before);
        }

        #[test]
        fn prop_watermark_strictly_increases_on_accepted_mutation(
            created_at in 0i64..1_000,
            ops in proptest::collection::vec(op_strategy(), 1..40),
        ) {
            let store = TolerantStore::new();
            store.create(&id(), &Payload::new("Added"), t(created_at)).unwrap();

            for op in ops {
                let before = store.watermark(&id());
                let result = match op {
                    Op::Update(time) => store.update(&id(), &Payload::new("Updated"), t(time)),
                    Op::Delete(time) => store.delete(&id(), t(time)),
                };

                match (result, before) {
                    (Ok(ApplyOutcome::Applied), Some(previous)) => {
                        if let Some(current) = store.watermark(&id()) {
                            prop_assert!(current > previous);
                        }
                    }
                    (Ok(ApplyOutcome::Stale), _) => {
                        prop_assert_eq!(store.watermark(&id()), before);
                    }
                    (Err(ReconcileError::NotFound { .. }), None) => {}
                    (other, before) => {
                        prop_assert!(false, "unexpected {:?} with watermark {:?}", other, before);
                    }
                }
            }
        }

        #[test]
        fn prop_create_after_delete_always_succeeds(
            created_at in 0i64..1_000,
            delete_gap in 1i64..1_000,
            recreate_at in -1_000i64..3_000,
        ) {
            let store = TolerantStore::new();
            store.create(&id(), &Payload::new("Added"), t(created_at)).unwrap();
            store.delete(&id(), t(created_at + delete_gap)).unwrap();

            let outcome = store.create(&id(), &Payload::new("Again"), t(recreate_at)).unwrap();
            prop_assert_eq!(outcome, ApplyOutcome::Applied);
            prop_assert_eq!(store.watermark(&id()), Some(t(recreate_at)));
        }
    }
}
