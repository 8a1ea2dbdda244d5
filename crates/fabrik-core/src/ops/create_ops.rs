use crate::attrs::Attributes;
use crate::blueprint::Blueprint;
use crate::errors::{FabrikError, Result};
use crate::ops::attr_ops::resolve_attributes;
use crate::registry::Registry;
use crate::store::EntityStore;

/// Idempotent create-or-find for one blueprint
///
/// With no identity keys the entity is always created. With identity keys
/// the resolved attributes are projected onto the key list and the store is
/// probed first; a hit returns the prior entity untouched (no hook, no field
/// update beyond what the registry's found-policy does), a miss creates.
///
/// Returns the entity and whether it was actually created in this call.
///
/// # Errors
///
/// * `MissingIdentityValue` - an identity key is absent after resolution
/// * `HookDepthExceeded` - the post-create hook chain recursed past the limit
/// * `Persistence` - store failure, propagated unmodified
pub fn create_entity<S: EntityStore>(
    registry: &Registry<S>,
    blueprint: &Blueprint<S>,
    supplied: &Attributes,
) -> Result<(S::Entity, bool)> {
    let resolved = resolve_attributes(supplied, blueprint);

    if blueprint.identity_keys.is_empty() {
        let entity = registry.store().insert(&blueprint.entity_type, &resolved)?;
        tracing::debug!(
            component = module_path!(),
            op = "create",
            blueprint = %blueprint.name,
            created = true,
        );
        run_hook(registry, blueprint, &entity)?;
        return Ok((entity, true));
    }

    let mut projection = Attributes::new();
    for key in &blueprint.identity_keys {
        match resolved.get(key) {
            Some(value) => projection.set(key.clone(), value.clone()),
            None => {
                return Err(FabrikError::MissingIdentityValue {
                    blueprint: blueprint.name.clone(),
                    field: key.clone(),
                })
            }
        }
    }

    if let Some(existing) = registry
        .store()
        .find_by(&blueprint.entity_type, &projection)?
    {
        registry.found_policy().on_found(&existing, &resolved)?;
        tracing::debug!(
            component = module_path!(),
            op = "create",
            blueprint = %blueprint.name,
            created = false,
        );
        return Ok((existing, false));
    }

    let entity = registry.store().insert(&blueprint.entity_type, &resolved)?;
    tracing::debug!(
        component = module_path!(),
        op = "create",
        blueprint = %blueprint.name,
        created = true,
    );
    run_hook(registry, blueprint, &entity)?;
    Ok((entity, true))
}

/// Run the blueprint's post-create hook, if configured
///
/// The depth guard is taken before the hook body executes, so a hook chain
/// that exceeds the registry's limit fails before the nested creation
/// reaches the store.
fn run_hook<S: EntityStore>(
    registry: &Registry<S>,
    blueprint: &Blueprint<S>,
    entity: &S::Entity,
) -> Result<()> {
    let Some(hook) = blueprint.after_create.clone() else {
        return Ok(());
    };
    let _guard = registry.enter_hook(&blueprint.name)?;
    hook(entity, registry)
}
