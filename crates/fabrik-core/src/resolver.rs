//! Semantic-name to entity-type resolution.
//!
//! Maps a pluralized, underscored semantic name like
//! `intergalactic_spaceships` to a registered entity type. The heuristic is
//! deterministic: singularize, camelize, try the flat name, then try one
//! namespace split per lowercase-to-uppercase boundary from left to right.
//! The first catalog hit wins; there is no backtracking.

use crate::catalog::{EntityType, TypeCatalog, NAMESPACE_SEPARATOR};

/// Outcome of a failed resolution: every type name that was tried, in order.
///
/// Carried into `FabrikError::UnknownBlueprint` so the caller can see which
/// candidates the heuristic generated.
pub type Attempts = Vec<String>;

/// Singularize an underscored plural name
///
/// Rule set, checked in order: `...ies` -> `...y`; sibilant `...es`
/// (`ses`, `xes`, `zes`, `ches`, `shes`) -> strip `es`; trailing `s` ->
/// strip it. Names that match no rule pass through unchanged. Irregular
/// English plurals are not supported; blueprints for such types can be
/// registered explicitly, which bypasses inflection.
pub fn singularize(name: &str) -> String {
    if let Some(stem) = name.strip_suffix("ies") {
        if !stem.is_empty() {
            return format!("{stem}y");
        }
    }
    for suffix in ["ses", "xes", "zes", "ches", "shes"] {
        if let Some(stem) = name.strip_suffix(suffix) {
            // Strip only the trailing "es", keeping the sibilant.
            return format!("{stem}{}", &suffix[..suffix.len() - 2]);
        }
    }
    if let Some(stem) = name.strip_suffix('s') {
        if !stem.is_empty() {
            return stem.to_string();
        }
    }
    name.to_string()
}

/// Pluralize an underscored singular name (inverse of `singularize`)
pub fn pluralize(name: &str) -> String {
    if let Some(stem) = name.strip_suffix('y') {
        let penultimate = stem.chars().last();
        if matches!(penultimate, Some(c) if !"aeiou".contains(c)) {
            return format!("{stem}ies");
        }
    }
    if name.ends_with('s')
        || name.ends_with('x')
        || name.ends_with('z')
        || name.ends_with("ch")
        || name.ends_with("sh")
    {
        return format!("{name}es");
    }
    format!("{name}s")
}

/// Convert an underscored name to a capitalized compound identifier
///
/// `intergalactic_spaceship` -> `IntergalacticSpaceship`.
pub fn camelize(name: &str) -> String {
    name.split('_')
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

/// Convert a capitalized (possibly namespaced) type name to underscored form
///
/// `Intergalactic.Spaceship` -> `intergalactic_spaceship`.
pub fn underscore(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev_was_boundary = true;
    for c in name.chars() {
        if c == NAMESPACE_SEPARATOR {
            if !prev_was_boundary {
                out.push('_');
            }
            prev_was_boundary = true;
        } else if c.is_uppercase() {
            if !prev_was_boundary {
                out.push('_');
            }
            out.extend(c.to_lowercase());
            prev_was_boundary = false;
        } else {
            out.push(c);
            prev_was_boundary = false;
        }
    }
    out
}

/// Resolve a semantic name to a registered entity type
///
/// Singularizes and camelizes the name, then tries the catalog for the flat
/// compound identifier. On a miss, each lowercase-to-uppercase boundary is
/// tried in turn, left to right, with a single namespace separator inserted
/// at that boundary. Resolution stops at the first hit. When every candidate
/// misses, the full attempt list is returned for diagnostics.
pub fn resolve_entity_type(catalog: &TypeCatalog, name: &str) -> Result<EntityType, Attempts> {
    let flat = camelize(&singularize(name));
    let mut attempts = vec![flat.clone()];

    if let Some(found) = catalog.lookup(&flat) {
        return Ok(found);
    }

    let chars: Vec<char> = flat.chars().collect();
    for boundary in 1..chars.len() {
        if chars[boundary - 1].is_lowercase() && chars[boundary].is_uppercase() {
            let mut candidate: String = chars[..boundary].iter().collect();
            candidate.push(NAMESPACE_SEPARATOR);
            candidate.extend(&chars[boundary..]);
            attempts.push(candidate.clone());

            if let Some(found) = catalog.lookup(&candidate) {
                return Ok(found);
            }
        }
    }

    Err(attempts)
}
