use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use fabrik_core::{Attributes, EntityStore, EntityType, PersistenceError};

/// One persisted entity
///
/// Records carry a UUID v7 id (time-ordered), the resolved attribute bag
/// they were created from, and a creation timestamp. This is the opaque
/// entity handle the engine passes around; only the store and the host ever
/// look inside.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    pub entity_type: EntityType,
    pub attrs: Attributes,
    pub created_at: DateTime<Utc>,
}

impl Record {
    /// Get an attribute value by field name
    pub fn get(&self, field: &str) -> Option<&serde_json::Value> {
        self.attrs.get(field)
    }
}

/// In-memory persistence collaborator
///
/// Keeps one record vector per entity type behind a mutex, so the store can
/// be driven through `&self` while hooks re-enter the engine mid-create.
/// `find_by` scans in insertion order and returns the first record whose
/// attributes match every key. Suited to tests and seeding; nothing is
/// written to disk.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<String, Vec<Record>>>,
}

impl MemoryStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Count the records of one entity type
    pub fn len_of(&self, entity_type: &EntityType) -> usize {
        self.lock()
            .get(entity_type.name())
            .map_or(0, Vec::len)
    }

    /// Check if the store holds no records at all
    pub fn is_empty(&self) -> bool {
        self.lock().values().all(Vec::is_empty)
    }

    /// Get a snapshot of all records of one entity type, in insertion order
    pub fn records_of(&self, entity_type: &EntityType) -> Vec<Record> {
        self.lock()
            .get(entity_type.name())
            .cloned()
            .unwrap_or_default()
    }

    /// Drop every record
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Vec<Record>>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl EntityStore for MemoryStore {
    type Entity = Record;

    fn insert(
        &self,
        entity_type: &EntityType,
        attrs: &Attributes,
    ) -> Result<Self::Entity, PersistenceError> {
        let record = Record {
            id: Uuid::now_v7().to_string(),
            entity_type: entity_type.clone(),
            attrs: attrs.clone(),
            created_at: Utc::now(),
        };
        tracing::debug!(
            component = module_path!(),
            op = "insert",
            entity_type = %entity_type,
            id = %record.id,
        );
        self.lock()
            .entry(entity_type.name().to_string())
            .or_default()
            .push(record.clone());
        Ok(record)
    }

    fn find_by(
        &self,
        entity_type: &EntityType,
        keys: &Attributes,
    ) -> Result<Option<Self::Entity>, PersistenceError> {
        let records = self.lock();
        let found = records.get(entity_type.name()).and_then(|list| {
            list.iter()
                .find(|record| {
                    keys.iter()
                        .all(|(field, value)| record.attrs.get(field) == Some(value))
                })
                .cloned()
        });
        Ok(found)
    }
}
