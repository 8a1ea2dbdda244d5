use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

use fabrik_core::{Attributes, EntityStore, EntityType, PersistenceError, Registry, TypeCatalog};

/// Minimal in-memory store for exercising the engine
///
/// Entities get sequential ids so tests can assert distinctness. A one-shot
/// failure switch simulates a store constraint violation on the next insert.
#[derive(Debug, Default)]
pub struct TestStore {
    next_id: AtomicU64,
    records: Mutex<Vec<TestEntity>>,
    fail_next_insert: AtomicBool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TestEntity {
    pub id: u64,
    pub entity_type: EntityType,
    pub attrs: Attributes,
}

impl TestStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `insert` fail with a persistence error
    #[allow(dead_code)]
    pub fn fail_next_insert(&self) {
        self.fail_next_insert.store(true, Ordering::SeqCst);
    }

    /// Count entities of one type
    #[allow(dead_code)]
    pub fn len_of(&self, entity_type: &EntityType) -> usize {
        self.records
            .lock()
            .unwrap()
            .iter()
            .filter(|entity| entity.entity_type == *entity_type)
            .count()
    }
}

impl EntityStore for TestStore {
    type Entity = TestEntity;

    fn insert(
        &self,
        entity_type: &EntityType,
        attrs: &Attributes,
    ) -> Result<Self::Entity, PersistenceError> {
        if self.fail_next_insert.swap(false, Ordering::SeqCst) {
            return Err(PersistenceError::new("simulated constraint violation"));
        }
        let entity = TestEntity {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            entity_type: entity_type.clone(),
            attrs: attrs.clone(),
        };
        self.records.lock().unwrap().push(entity.clone());
        Ok(entity)
    }

    fn find_by(
        &self,
        entity_type: &EntityType,
        keys: &Attributes,
    ) -> Result<Option<Self::Entity>, PersistenceError> {
        let records = self.records.lock().unwrap();
        Ok(records
            .iter()
            .find(|entity| {
                entity.entity_type == *entity_type
                    && keys
                        .iter()
                        .all(|(field, value)| entity.attrs.get(field) == Some(value))
            })
            .cloned())
    }
}

/// Build a registry over a fresh TestStore with the usual test types
/// registered in its catalog
pub fn new_registry() -> Registry<TestStore> {
    let catalog = TypeCatalog::from_iter([
        "Person",
        "Company",
        "Employee",
        "InterplanetarySpaceship",
        "Intergalactic.Spaceship",
    ]);
    Registry::with_catalog(TestStore::new(), catalog)
}
