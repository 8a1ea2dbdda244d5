//! Seed a small object graph through the factory engine.
//!
//! Run with: cargo run --example seed_demo

use serde_json::json;

use fabrik_core::logging_facility::{init, Profile};
use fabrik_core::{Attributes, EntityType, Registry, TypeCatalog};
use fabrik_store::MemoryStore;

fn main() -> fabrik_core::Result<()> {
    init(Profile::Development);

    let catalog = TypeCatalog::from_iter(["Company", "Employee"]);
    let registry = Registry::with_catalog(MemoryStore::new(), catalog);

    // Companies are idempotent over their name; every new company gets a CEO.
    registry
        .with(EntityType::new("Company"))
        .default_value("country", "NZ")
        .identity_keys(["name"])
        .after_create(|company, registry| {
            registry.resolve("employees")?.create(Attributes::from_iter([
                ("role", json!("CEO")),
                ("company_id", json!(company.id.clone())),
            ]))?;
            Ok(())
        });

    let companies = registry.resolve("companies")?;
    let acme = companies.create_as(
        "acme",
        Attributes::from_iter([("name", json!("Acme Corp"))]),
    )?;
    println!("created {} ({})", acme.id, acme.entity_type);

    // Same identity: returns the prior entity, hires nobody new.
    let again = companies.create(Attributes::from_iter([("name", json!("Acme Corp"))]))?;
    println!("idempotent re-create returned {}", again.id);

    let employee_type = EntityType::new("Employee");
    println!(
        "employees on staff: {}",
        registry.store().len_of(&employee_type)
    );

    let labeled = companies.get("acme")?;
    println!("label 'acme' -> {}", labeled.id);

    Ok(())
}
