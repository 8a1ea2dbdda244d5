//! Found-entity policy trait and default implementation
//!
//! When an idempotent create matches an existing entity, the engine never
//! updates the entity's non-key fields itself; whether anything should
//! happen on reuse is an application decision. This module makes that
//! decision an explicit, injectable policy.

use crate::attrs::Attributes;
use crate::errors::Result;
use crate::store::EntityStore;

/// Policy invoked when an idempotent create finds a pre-existing entity
///
/// The engine calls `on_found` with the existing entity and the freshly
/// resolved attribute bag before returning the entity to the caller. The
/// post-create hook is never run for a found entity regardless of policy.
///
/// A host that wants touch-on-reuse semantics (e.g. bumping a timestamp or
/// reconciling non-key fields) implements this against its own persistence
/// surface; the engine's store contract deliberately has no update
/// capability.
pub trait FoundPolicy<S: EntityStore> {
    /// React to an idempotent create matching `entity`
    ///
    /// # Errors
    ///
    /// An error aborts the in-flight create chain and surfaces to the
    /// caller; the existing entity is not returned.
    fn on_found(&self, entity: &S::Entity, resolved: &Attributes) -> Result<()>;
}

/// Default policy: return the existing entity untouched
///
/// Idempotent re-creation is a pure no-op beyond returning the prior
/// handle.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReturnExisting;

impl<S: EntityStore> FoundPolicy<S> for ReturnExisting {
    fn on_found(&self, _entity: &S::Entity, _resolved: &Attributes) -> Result<()> {
        Ok(())
    }
}
