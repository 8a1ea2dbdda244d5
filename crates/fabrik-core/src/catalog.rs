use std::collections::HashSet;
use std::fmt;
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use crate::resolver;

/// Namespace separator used in canonical type names
pub const NAMESPACE_SEPARATOR: char = '.';

/// Canonical name of a backing entity type
///
/// The name may be namespaced with `.` separators, e.g.
/// `"Intergalactic.Spaceship"`. The engine dispatches store calls on this
/// value; it carries no behavior of its own.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityType(String);

impl EntityType {
    /// Create an entity type from its canonical name
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the full canonical name, including any namespace
    pub fn name(&self) -> &str {
        &self.0
    }

    /// Get the name segment after the last namespace separator
    pub fn base_name(&self) -> &str {
        self.0
            .rsplit(NAMESPACE_SEPARATOR)
            .next()
            .unwrap_or(&self.0)
    }

    /// Derive the canonical blueprint name for this type
    ///
    /// This is the pluralized, underscored form of the full name:
    /// `"Intergalactic.Spaceship"` becomes `"intergalactic_spaceships"`.
    pub fn blueprint_name(&self) -> String {
        resolver::pluralize(&resolver::underscore(&self.0))
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Host-supplied registration table of known entity types
///
/// Name resolution operates over this explicit catalog instead of ambient
/// runtime reflection: only type names the host has registered can ever be
/// resolved. Registration goes through `&self` so a registry can share the
/// catalog without handing out mutable references.
#[derive(Debug, Default)]
pub struct TypeCatalog {
    names: Mutex<HashSet<String>>,
}

impl TypeCatalog {
    /// Create a new empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a type name, returning its handle
    ///
    /// Registering the same name twice is a no-op.
    pub fn register(&self, name: impl Into<String>) -> EntityType {
        let name = name.into();
        self.lock().insert(name.clone());
        EntityType(name)
    }

    /// Look up a type name, returning its handle if registered
    pub fn lookup(&self, name: &str) -> Option<EntityType> {
        if self.lock().contains(name) {
            Some(EntityType(name.to_string()))
        } else {
            None
        }
    }

    /// Check if a type name is registered
    pub fn contains(&self, name: &str) -> bool {
        self.lock().contains(name)
    }

    /// Get the number of registered types
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Check if the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashSet<String>> {
        self.names.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Clone for TypeCatalog {
    fn clone(&self) -> Self {
        Self {
            names: Mutex::new(self.lock().clone()),
        }
    }
}

impl<S: Into<String>> FromIterator<S> for TypeCatalog {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let catalog = Self::new();
        for name in iter {
            catalog.register(name);
        }
        catalog
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_only_finds_registered_names() {
        let catalog = TypeCatalog::new();
        assert!(catalog.lookup("Person").is_none());

        let person = catalog.register("Person");
        assert_eq!(person.name(), "Person");
        assert_eq!(catalog.lookup("Person"), Some(person));
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn base_name_strips_namespace() {
        let ty = EntityType::new("Intergalactic.Spaceship");
        assert_eq!(ty.base_name(), "Spaceship");
        assert_eq!(EntityType::new("Person").base_name(), "Person");
    }

    #[test]
    fn blueprint_name_is_plural_underscored() {
        assert_eq!(
            EntityType::new("Intergalactic.Spaceship").blueprint_name(),
            "intergalactic_spaceships"
        );
        assert_eq!(EntityType::new("Company").blueprint_name(), "companies");
    }
}
