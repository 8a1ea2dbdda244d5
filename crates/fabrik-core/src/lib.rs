//! Fabrik Core - Blueprint registry and idempotent entity-factory engine
//!
//! This crate provides the factory engine Fabrik is built around:
//! - Blueprints: per-entity-type templates with ordered default generators,
//!   identity keys, and an optional post-create hook
//! - Attribute resolution merging supplied values with defaults in
//!   declaration order
//! - Idempotent create-or-find over identity keys, with the hook firing
//!   exactly once per actually-created entity
//! - Per-blueprint label stores so later statements can reference
//!   earlier-created entities
//! - Heuristic semantic-name resolution over an explicit type catalog
//!
//! Persistence is a two-method trait seam (`EntityStore`); the engine never
//! persists anything itself.

pub mod attrs;
pub mod blueprint;
pub mod catalog;
pub mod errors;
pub mod logging_facility;
pub mod ops;
pub mod policy;
pub mod proxy;
pub mod registry;
pub mod resolver;
pub mod store;

// Re-export commonly used types
pub use attrs::Attributes;
pub use blueprint::{Blueprint, BlueprintBuilder, DefaultSpec};
pub use catalog::{EntityType, TypeCatalog};
pub use errors::{ErrorKind, FabrikError, PersistenceError, Result};
pub use policy::{FoundPolicy, ReturnExisting};
pub use proxy::Proxy;
pub use registry::{Registry, DEFAULT_MAX_HOOK_DEPTH};
pub use store::EntityStore;
