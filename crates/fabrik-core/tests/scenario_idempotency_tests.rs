/// Scenario: Idempotent Create-or-Find
///
/// With identity keys configured, a second create whose resolved attributes
/// project identically onto the keys returns the prior entity untouched and
/// skips the hook. Without identity keys every create yields a distinct
/// entity. A missing identity value and a store failure each abort the
/// chain.
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde_json::json;

use fabrik_core::{
    Attributes, EntityStore, EntityType, ErrorKind, FoundPolicy, Registry, Result as FabrikResult,
};

mod common;

use common::TestStore;

#[test]
fn test_duplicate_identity_returns_prior_entity_unchanged() {
    // GIVEN a Person blueprint keyed on first_name + last_name, with a
    // counting hook
    let registry = common::new_registry();
    let hook_calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hook_calls);
    registry
        .with(EntityType::new("Person"))
        .identity_keys(["first_name", "last_name"])
        .after_create(move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
    let proxy = registry.resolve("persons").expect("blueprint registered");

    // WHEN creating twice with the same identity and different ages
    let first = proxy
        .create_as(
            "a",
            Attributes::from_iter([
                ("first_name", json!("Alice")),
                ("last_name", json!("Aardvark")),
                ("age", json!(25)),
            ]),
        )
        .expect("first create");
    let second = proxy
        .create_as(
            "b",
            Attributes::from_iter([
                ("first_name", json!("Alice")),
                ("last_name", json!("Aardvark")),
                ("age", json!(99)),
            ]),
        )
        .expect("second create");

    // THEN the prior entity comes back with its original age
    assert_eq!(second.id, first.id);
    assert_eq!(second.attrs.get("age"), Some(&json!(25)));
    assert_eq!(registry.store().len_of(&EntityType::new("Person")), 1);

    // AND the hook fired only during the first call
    assert_eq!(hook_calls.load(Ordering::SeqCst), 1);

    // AND both labels point at the same entity
    assert_eq!(proxy.get("a").unwrap().id, proxy.get("b").unwrap().id);
}

#[test]
fn test_no_identity_keys_always_creates() {
    // GIVEN a blueprint with no identity keys
    let registry = common::new_registry();
    registry
        .with(EntityType::new("Person"))
        .default_value("first_name", "Alice");
    let proxy = registry.resolve("persons").expect("blueprint registered");

    // WHEN creating four times with identical attributes
    let ids: Vec<u64> = (0..4)
        .map(|_| proxy.create(Attributes::new()).expect("create").id)
        .collect();

    // THEN every entity is distinct
    let mut deduped = ids.clone();
    deduped.dedup();
    assert_eq!(deduped, ids);
    assert_eq!(registry.store().len_of(&EntityType::new("Person")), 4);
}

#[test]
fn test_missing_identity_value_aborts_creation() {
    // GIVEN a blueprint keyed on a field with no default
    let registry = common::new_registry();
    registry
        .with(EntityType::new("Person"))
        .identity_keys(["email"]);
    let proxy = registry.resolve("persons").expect("blueprint registered");

    // WHEN creating without the key field
    let err = proxy
        .create(Attributes::from_iter([("first_name", json!("Alice"))]))
        .expect_err("create should fail");

    // THEN the error names the key and nothing was stored
    assert_eq!(err.kind(), ErrorKind::MissingIdentityValue);
    assert!(err.to_string().contains("email"));
    assert_eq!(registry.store().len_of(&EntityType::new("Person")), 0);
}

#[test]
fn test_identity_key_satisfied_by_default_generator() {
    // GIVEN identity keys whose values come from defaults
    let registry = common::new_registry();
    registry
        .with(EntityType::new("Person"))
        .default_value("email", "alice@example.com")
        .identity_keys(["email"]);
    let proxy = registry.resolve("persons").expect("blueprint registered");

    // WHEN creating twice with no supplied attributes
    let first = proxy.create(Attributes::new()).expect("create");
    let second = proxy.create(Attributes::new()).expect("create");

    // THEN the generated key value deduplicates the pair
    assert_eq!(first.id, second.id);
}

#[test]
fn test_persistence_error_passes_through() {
    // GIVEN a store that fails the next insert
    let registry = common::new_registry();
    registry.with(EntityType::new("Person"));
    let proxy = registry.resolve("persons").expect("blueprint registered");
    registry.store().fail_next_insert();

    // WHEN creating
    let err = proxy
        .create_as("doomed", Attributes::new())
        .expect_err("create should fail");

    // THEN the store's error surfaces unmodified
    assert_eq!(err.kind(), ErrorKind::Persistence);
    assert_eq!(err.to_string(), "simulated constraint violation");

    // AND the label was never bound
    assert_eq!(
        proxy.get("doomed").unwrap_err().kind(),
        ErrorKind::LabelNotFound
    );
}

/// Policy that records the ages it saw on reuse
struct RecordingPolicy {
    seen: Arc<AtomicUsize>,
}

impl FoundPolicy<TestStore> for RecordingPolicy {
    fn on_found(
        &self,
        _entity: &<TestStore as EntityStore>::Entity,
        resolved: &Attributes,
    ) -> FabrikResult<()> {
        let age = resolved.get("age").and_then(serde_json::Value::as_u64);
        self.seen.store(age.unwrap_or(0) as usize, Ordering::SeqCst);
        Ok(())
    }
}

#[test]
fn test_found_policy_observes_resolved_attributes() {
    // GIVEN a registry with a recording found-policy
    let registry: Registry<TestStore> = common::new_registry();
    let seen = Arc::new(AtomicUsize::new(0));
    registry.set_found_policy(RecordingPolicy {
        seen: Arc::clone(&seen),
    });
    registry
        .with(EntityType::new("Person"))
        .identity_keys(["first_name"]);
    let proxy = registry.resolve("persons").expect("blueprint registered");

    // WHEN an idempotent create matches an existing entity
    proxy
        .create(Attributes::from_iter([
            ("first_name", json!("Alice")),
            ("age", json!(25)),
        ]))
        .expect("first create");
    proxy
        .create(Attributes::from_iter([
            ("first_name", json!("Alice")),
            ("age", json!(42)),
        ]))
        .expect("second create");

    // THEN the policy saw the second call's resolved attributes
    assert_eq!(seen.load(Ordering::SeqCst), 42);
}
