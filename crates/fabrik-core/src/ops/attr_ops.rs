use crate::attrs::Attributes;
use crate::blueprint::Blueprint;
use crate::store::EntityStore;

/// Merge supplied attributes with a blueprint's defaults
///
/// Starting from the supplied bag, the blueprint's defaults are walked in
/// declaration order; each field not already present is computed against the
/// bag accumulated so far and appended. After all defaults run, the supplied
/// values are overlaid on top, so caller intent wins even if a generator was
/// mistakenly invoked for a supplied field.
///
/// Ordering is guaranteed only within one call against one blueprint
/// snapshot; re-configuring the blueprint voids any cross-call ordering
/// assumption.
pub fn resolve_attributes<S: EntityStore>(
    supplied: &Attributes,
    blueprint: &Blueprint<S>,
) -> Attributes {
    let mut bag = supplied.clone();

    for (field, spec) in &blueprint.defaults {
        if bag.contains(field) {
            continue;
        }
        let value = spec.eval(&bag);
        bag.set(field.clone(), value);
    }

    // Supplied values take precedence over anything generated.
    for (field, value) in supplied.iter() {
        bag.set(field, value.clone());
    }

    bag
}
