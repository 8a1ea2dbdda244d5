use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::attrs::Attributes;
use crate::catalog::EntityType;
use crate::errors::Result;
use crate::registry::Registry;
use crate::store::EntityStore;

/// Post-create hook: runs synchronously, exactly once per actually-created
/// entity, and may re-enter the registry to create dependent entities.
pub type Hook<S> =
    Arc<dyn Fn(&<S as EntityStore>::Entity, &Registry<S>) -> Result<()> + Send + Sync>;

/// Generator function for one default attribute
pub type Generator = Arc<dyn Fn(&Attributes) -> Value + Send + Sync>;

/// Declared default for a single field
///
/// A constant is equivalent to a zero-argument generator. A generator
/// receives only the attribute bag accumulated so far in declaration order
/// (explicitly supplied values plus defaults already generated); it must not
/// assume access to fields declared later in the same blueprint.
#[derive(Clone)]
pub enum DefaultSpec {
    /// Fixed value, used as-is
    Constant(Value),
    /// Computed from the attributes resolved so far
    Generated(Generator),
}

impl DefaultSpec {
    /// Evaluate this default against the bag accumulated so far
    pub fn eval(&self, so_far: &Attributes) -> Value {
        match self {
            DefaultSpec::Constant(value) => value.clone(),
            DefaultSpec::Generated(generator) => generator(so_far),
        }
    }
}

impl fmt::Debug for DefaultSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultSpec::Constant(value) => f.debug_tuple("Constant").field(value).finish(),
            DefaultSpec::Generated(_) => f.write_str("Generated(..)"),
        }
    }
}

/// Per-entity-type template: ordered default generators, identity keys, and
/// an optional post-create hook
///
/// Created on first registration and mutated by later builder sessions;
/// lives for the lifetime of the owning registry.
pub struct Blueprint<S: EntityStore> {
    pub(crate) name: String,
    pub(crate) entity_type: EntityType,
    pub(crate) defaults: Vec<(String, DefaultSpec)>,
    pub(crate) identity_keys: Vec<String>,
    pub(crate) after_create: Option<Hook<S>>,
}

impl<S: EntityStore> Blueprint<S> {
    /// Create an empty blueprint for the given type
    pub(crate) fn new(name: impl Into<String>, entity_type: EntityType) -> Self {
        Self {
            name: name.into(),
            entity_type,
            defaults: Vec::new(),
            identity_keys: Vec::new(),
            after_create: None,
        }
    }

    /// Get the canonical blueprint name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the backing entity type
    pub fn entity_type(&self) -> &EntityType {
        &self.entity_type
    }

    /// Get the identity keys, in declaration order
    pub fn identity_keys(&self) -> &[String] {
        &self.identity_keys
    }

    /// Iterate the default field names, in declaration order
    pub fn default_fields(&self) -> impl Iterator<Item = &str> {
        self.defaults.iter().map(|(field, _)| field.as_str())
    }

    /// Check if a post-create hook is configured
    pub fn has_hook(&self) -> bool {
        self.after_create.is_some()
    }
}

impl<S: EntityStore> Clone for Blueprint<S> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            entity_type: self.entity_type.clone(),
            defaults: self.defaults.clone(),
            identity_keys: self.identity_keys.clone(),
            after_create: self.after_create.clone(),
        }
    }
}

impl<S: EntityStore> fmt::Debug for Blueprint<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Blueprint")
            .field("name", &self.name)
            .field("entity_type", &self.entity_type)
            .field("defaults", &self.defaults)
            .field("identity_keys", &self.identity_keys)
            .field("has_hook", &self.after_create.is_some())
            .finish()
    }
}

/// Builder-style configuration surface for one registered blueprint
///
/// Returned by `Registry::with`/`Registry::with_alias`. Every call applies
/// immediately to the stored blueprint. Re-configuration overwrites per
/// group, wholesale: the first `default_value`/`default_fn` call of a
/// session clears any previously declared defaults, and `identity_keys` and
/// `after_create` each replace their group outright. Groups not touched in
/// a session are preserved.
pub struct BlueprintBuilder<'r, S: EntityStore> {
    registry: &'r Registry<S>,
    name: String,
    entity_type: EntityType,
    defaults_touched: bool,
}

impl<'r, S: EntityStore> BlueprintBuilder<'r, S> {
    pub(crate) fn new(registry: &'r Registry<S>, name: String, entity_type: EntityType) -> Self {
        Self {
            registry,
            name,
            entity_type,
            defaults_touched: false,
        }
    }

    /// Get the canonical name of the blueprint being configured
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declare a constant default for a field
    pub fn default_value(mut self, field: &str, value: impl Into<Value>) -> Self {
        let spec = DefaultSpec::Constant(value.into());
        self.push_default(field, spec);
        self
    }

    /// Declare a generated default for a field
    ///
    /// The generator sees only the attributes resolved before this field in
    /// declaration order.
    pub fn default_fn<F>(mut self, field: &str, generator: F) -> Self
    where
        F: Fn(&Attributes) -> Value + Send + Sync + 'static,
    {
        let spec = DefaultSpec::Generated(Arc::new(generator));
        self.push_default(field, spec);
        self
    }

    /// Declare the identity keys used for idempotent create-or-find
    ///
    /// Replaces any previously declared key list.
    pub fn identity_keys<I, T>(self, keys: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let keys: Vec<String> = keys.into_iter().map(Into::into).collect();
        self.update(|blueprint| blueprint.identity_keys = keys);
        self
    }

    /// Declare the post-create hook
    ///
    /// Replaces any previously declared hook. The hook runs exactly once per
    /// actually-created entity, never for a found one, and may re-enter the
    /// registry.
    pub fn after_create<F>(self, hook: F) -> Self
    where
        F: Fn(&S::Entity, &Registry<S>) -> Result<()> + Send + Sync + 'static,
    {
        let hook: Hook<S> = Arc::new(hook);
        self.update(|blueprint| blueprint.after_create = Some(hook));
        self
    }

    fn push_default(&mut self, field: &str, spec: DefaultSpec) {
        let first_touch = !self.defaults_touched;
        self.defaults_touched = true;
        let field = field.to_string();
        self.update(move |blueprint| {
            if first_touch {
                blueprint.defaults.clear();
            }
            blueprint.defaults.push((field, spec));
        });
    }

    fn update(&self, apply: impl FnOnce(&mut Blueprint<S>)) {
        self.registry
            .update_blueprint(&self.name, &self.entity_type, apply);
    }
}
