use std::fmt;

use crate::attrs::Attributes;
use crate::errors::{FabrikError, Result};
use crate::registry::Registry;
use crate::store::EntityStore;

/// Per-blueprint facade exposing creation and the label store
///
/// Obtained from `Registry::resolve`. Borrowed from the registry, so a proxy
/// is as cheap to re-resolve as to keep around.
pub struct Proxy<'r, S: EntityStore> {
    registry: &'r Registry<S>,
    name: String,
}

impl<S: EntityStore> fmt::Debug for Proxy<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Proxy").field("name", &self.name).finish()
    }
}

impl<'r, S: EntityStore> Proxy<'r, S> {
    pub(crate) fn new(registry: &'r Registry<S>, name: String) -> Self {
        Self { registry, name }
    }

    /// Get the canonical name of the blueprint this proxy addresses
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Create an entity anonymously
    ///
    /// The entity is returned but never stored in the label map.
    ///
    /// # Errors
    ///
    /// * `MissingIdentityValue` - an identity key is absent after resolution
    /// * `HookDepthExceeded` - hook recursion passed the configured limit
    /// * `Persistence` - store failure, propagated unmodified
    pub fn create(&self, attrs: Attributes) -> Result<S::Entity> {
        self.registry.create_in(&self.name, None, &attrs)
    }

    /// Create an entity and bind a label to it
    ///
    /// Re-using a label silently overwrites the prior binding. A failed
    /// create binds nothing.
    ///
    /// # Errors
    ///
    /// Same as [`Proxy::create`].
    pub fn create_as(&self, label: &str, attrs: Attributes) -> Result<S::Entity> {
        self.registry.create_in(&self.name, Some(label), &attrs)
    }

    /// Get the entity most recently bound to a label
    ///
    /// # Errors
    ///
    /// Returns `LabelNotFound` when nothing is bound to the label in this
    /// blueprint.
    pub fn get(&self, label: &str) -> Result<S::Entity> {
        self.registry
            .label(&self.name, label)
            .ok_or_else(|| FabrikError::LabelNotFound {
                blueprint: self.name.clone(),
                label: label.to_string(),
            })
    }
}
