//! Entity field - collection of live entity records

use std::collections::HashMap;

use tidemark_core::{EntityId, EntityRecord, EventTime};

/// Read-only copy of the live map
pub type Snapshot = HashMap<EntityId, EntityRecord>;

/// Entity field - the live entities of a store
///
/// An id is live iff it has an entry. Removing an entry drops its watermark
/// with it: no tombstone survives a delete.
#[derive(Debug, Default)]
pub struct EntityField {
    records: HashMap<EntityId, EntityRecord>,
}

impl EntityField {
    pub fn new() -> Self {
        EntityField::default()
    }

    /// Get a mutable record by id
    pub fn get_mut(&mut self, id: &EntityId) -> Option<&mut EntityRecord> {
        self.records.get_mut(id)
    }

    /// Insert or replace a record
    pub fn insert(&mut self, record: EntityRecord) {
        self.records.insert(record.id.clone(), record);
    }

    /// Remove a record together with its watermark
    pub fn remove(&mut self, id: &EntityId) -> Option<EntityRecord> {
        self.records.remove(id)
    }

    pub fn contains(&self, id: &EntityId) -> bool {
        self.records.contains_key(id)
    }

    /// Watermark of a live id
    pub fn watermark(&self, id: &EntityId) -> Option<EventTime> {
        self.records.get(id).map(EntityRecord::watermark)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Copy of every live record
    pub fn snapshot(&self) -> Snapshot {
        self.records.clone()
    }
}
