use crate::attrs::Attributes;
use crate::catalog::EntityType;
use crate::errors::PersistenceError;

/// Persistence seam between the engine and the host's storage
///
/// The engine depends on exactly two capabilities per entity type: create an
/// entity from a resolved attribute bag, and find one by an identity-key
/// projection. The `Entity` handle is opaque to the engine: it is stored in
/// label maps, handed to hooks, and returned to callers, but never inspected.
///
/// Methods take `&self`; an in-memory implementation is expected to use
/// interior mutability, since post-create hooks re-enter the engine (and
/// therefore the store) while an outer create is still in flight.
pub trait EntityStore {
    /// Opaque handle to a persisted entity
    type Entity: Clone;

    /// Create an entity of the given type from resolved attributes
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError` on constraint or validation failure. The
    /// engine propagates it unmodified.
    fn insert(
        &self,
        entity_type: &EntityType,
        attrs: &Attributes,
    ) -> Result<Self::Entity, PersistenceError>;

    /// Find an entity of the given type matching every key attribute
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError` on store failure. A clean miss is
    /// `Ok(None)`, not an error.
    fn find_by(
        &self,
        entity_type: &EntityType,
        keys: &Attributes,
    ) -> Result<Option<Self::Entity>, PersistenceError>;
}
