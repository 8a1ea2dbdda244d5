use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::attrs::Attributes;
use crate::blueprint::{Blueprint, BlueprintBuilder};
use crate::catalog::{EntityType, TypeCatalog};
use crate::errors::{FabrikError, Result};
use crate::ops::create_ops;
use crate::policy::{FoundPolicy, ReturnExisting};
use crate::proxy::Proxy;
use crate::resolver;
use crate::store::EntityStore;

/// Default limit on post-create hook recursion depth
pub const DEFAULT_MAX_HOOK_DEPTH: usize = 64;

/// Top-level facade: registers blueprints, dispatches semantic names, and
/// owns one label map per blueprint
///
/// All operations are synchronous and run inline on the caller's thread;
/// hooks may re-enter the registry recursively. The internal maps are each
/// guarded by a mutex scoped to this instance, so the maps themselves stay
/// consistent if the registry is shared, but create-or-find sequences are
/// not atomic across maps: single-writer usage is the supported contract.
/// Test-scoped registries are independent instances and interfere with
/// nothing.
pub struct Registry<S: EntityStore> {
    store: S,
    catalog: TypeCatalog,
    blueprints: Mutex<HashMap<String, Arc<Blueprint<S>>>>,
    aliases: Mutex<HashMap<String, String>>,
    labels: Mutex<HashMap<String, HashMap<String, S::Entity>>>,
    found_policy: Mutex<Arc<dyn FoundPolicy<S> + Send + Sync>>,
    hook_depth: AtomicUsize,
    max_hook_depth: AtomicUsize,
}

impl<S: EntityStore> Registry<S> {
    /// Create a registry over the given store with an empty type catalog
    pub fn new(store: S) -> Self {
        Self::with_catalog(store, TypeCatalog::new())
    }

    /// Create a registry over the given store and a pre-built type catalog
    pub fn with_catalog(store: S, catalog: TypeCatalog) -> Self {
        Self {
            store,
            catalog,
            blueprints: Mutex::new(HashMap::new()),
            aliases: Mutex::new(HashMap::new()),
            labels: Mutex::new(HashMap::new()),
            found_policy: Mutex::new(Arc::new(ReturnExisting)),
            hook_depth: AtomicUsize::new(0),
            max_hook_depth: AtomicUsize::new(DEFAULT_MAX_HOOK_DEPTH),
        }
    }

    /// Get the external store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Get the type catalog
    pub fn catalog(&self) -> &TypeCatalog {
        &self.catalog
    }

    /// Register an entity type in the catalog
    pub fn register_type(&self, name: impl Into<String>) -> EntityType {
        self.catalog.register(name)
    }

    /// Set the post-create hook recursion limit
    pub fn set_max_hook_depth(&self, depth: usize) {
        self.max_hook_depth.store(depth, Ordering::Relaxed);
    }

    /// Set the policy applied when an idempotent create finds an existing
    /// entity
    pub fn set_found_policy(&self, policy: impl FoundPolicy<S> + Send + Sync + 'static) {
        *lock(&self.found_policy) = Arc::new(policy);
    }

    /// Register (or re-open for configuration) the blueprint for a type
    ///
    /// The blueprint is keyed by the pluralized, underscored form of the
    /// type name; `resolve` on that name succeeds from here on. Returns a
    /// builder; each builder call applies immediately, overwriting the
    /// touched group wholesale.
    pub fn with(&self, entity_type: EntityType) -> BlueprintBuilder<'_, S> {
        let name = entity_type.blueprint_name();
        self.ensure_blueprint(&name, &entity_type);
        BlueprintBuilder::new(self, name, entity_type)
    }

    /// Register a blueprint and an alias pointing at it
    ///
    /// The alias resolves to the same blueprint and shares its label map.
    pub fn with_alias(&self, entity_type: EntityType, alias: &str) -> BlueprintBuilder<'_, S> {
        let builder = self.with(entity_type);
        lock(&self.aliases).insert(alias.to_string(), builder.name().to_string());
        tracing::debug!(
            component = module_path!(),
            op = "alias",
            alias = alias,
            blueprint = builder.name(),
        );
        builder
    }

    /// Resolve a semantic name to its per-blueprint proxy
    ///
    /// Exact blueprint names and aliases match first. Otherwise the name
    /// heuristic runs against the catalog; on success an empty blueprint is
    /// auto-registered for the resolved type under the given name.
    ///
    /// # Errors
    ///
    /// Returns `UnknownBlueprint` when no blueprint, alias, or catalog
    /// candidate matches; the error carries every type name attempted.
    pub fn resolve(&self, name: &str) -> Result<Proxy<'_, S>> {
        if let Some(canonical) = self.canonical_name(name) {
            return Ok(Proxy::new(self, canonical));
        }

        match resolver::resolve_entity_type(&self.catalog, name) {
            Ok(entity_type) => {
                self.ensure_blueprint(name, &entity_type);
                tracing::debug!(
                    component = module_path!(),
                    op = "resolve",
                    name = name,
                    entity_type = %entity_type,
                );
                Ok(Proxy::new(self, name.to_string()))
            }
            Err(attempts) => Err(FabrikError::UnknownBlueprint {
                name: name.to_string(),
                attempts,
            }),
        }
    }

    /// Look up a registered blueprint by canonical name or alias
    pub fn blueprint(&self, name: &str) -> Option<Arc<Blueprint<S>>> {
        let canonical = self.canonical_name(name)?;
        lock(&self.blueprints).get(&canonical).cloned()
    }

    /// Map a name to the canonical blueprint name it addresses, if any
    fn canonical_name(&self, name: &str) -> Option<String> {
        if lock(&self.blueprints).contains_key(name) {
            return Some(name.to_string());
        }
        lock(&self.aliases).get(name).cloned()
    }

    fn ensure_blueprint(&self, name: &str, entity_type: &EntityType) {
        let mut blueprints = lock(&self.blueprints);
        blueprints
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(Blueprint::new(name, entity_type.clone())));
    }

    pub(crate) fn update_blueprint(
        &self,
        name: &str,
        entity_type: &EntityType,
        apply: impl FnOnce(&mut Blueprint<S>),
    ) {
        let mut blueprints = lock(&self.blueprints);
        let entry = blueprints
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(Blueprint::new(name, entity_type.clone())));
        apply(Arc::make_mut(entry));
    }

    /// Create an entity through the named blueprint, optionally binding a
    /// label to the result
    ///
    /// The blueprint snapshot is taken before any store access, so a hook
    /// re-entering the registry never observes a half-applied create.
    pub(crate) fn create_in(
        &self,
        name: &str,
        label: Option<&str>,
        supplied: &Attributes,
    ) -> Result<S::Entity> {
        let blueprint = self
            .blueprint(name)
            .ok_or_else(|| FabrikError::UnknownBlueprint {
                name: name.to_string(),
                attempts: Vec::new(),
            })?;

        let (entity, _created) = create_ops::create_entity(self, &blueprint, supplied)?;

        if let Some(label) = label {
            self.bind_label(blueprint.name(), label, entity.clone());
        }
        Ok(entity)
    }

    /// Bind a label in the blueprint's label map, overwriting any prior
    /// binding
    pub(crate) fn bind_label(&self, blueprint: &str, label: &str, entity: S::Entity) {
        let mut labels = lock(&self.labels);
        let replaced = labels
            .entry(blueprint.to_string())
            .or_default()
            .insert(label.to_string(), entity)
            .is_some();
        if replaced {
            tracing::debug!(
                component = module_path!(),
                op = "bind_label",
                blueprint = blueprint,
                label = label,
                replaced = true,
            );
        }
    }

    /// Read a label from the blueprint's label map
    pub(crate) fn label(&self, blueprint: &str, label: &str) -> Option<S::Entity> {
        lock(&self.labels)
            .get(blueprint)
            .and_then(|map| map.get(label))
            .cloned()
    }

    /// Get the found-entity policy
    pub(crate) fn found_policy(&self) -> Arc<dyn FoundPolicy<S> + Send + Sync> {
        lock(&self.found_policy).clone()
    }

    /// Enter one level of hook recursion, failing past the configured limit
    ///
    /// The returned guard releases the level when dropped, including on
    /// error unwind.
    pub(crate) fn enter_hook(&self, blueprint: &str) -> Result<HookGuard<'_>> {
        let depth = self.hook_depth.fetch_add(1, Ordering::Relaxed) + 1;
        if depth > self.max_hook_depth.load(Ordering::Relaxed) {
            self.hook_depth.fetch_sub(1, Ordering::Relaxed);
            return Err(FabrikError::HookDepthExceeded {
                blueprint: blueprint.to_string(),
                depth,
            });
        }
        Ok(HookGuard {
            depth: &self.hook_depth,
        })
    }
}

/// RAII guard for one level of hook recursion depth
pub(crate) struct HookGuard<'a> {
    depth: &'a AtomicUsize,
}

impl Drop for HookGuard<'_> {
    fn drop(&mut self) {
        self.depth.fetch_sub(1, Ordering::Relaxed);
    }
}

/// Lock a mutex, ignoring poisoning
///
/// The registry holds no invariant that a panicked writer could leave
/// half-applied inside a single map, so a poisoned lock is still usable.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
