//! Fabrik Store - Reference in-memory persistence for the Fabrik engine
//!
//! Implements the engine's two-method `EntityStore` seam with an in-memory
//! record store, and exposes the lazily-created process-wide default
//! registry. The engine core stays persistence-free; this crate is what a
//! host wires in when it has no storage of its own (tests, seeding, demos).

pub mod global;
pub mod memory;

pub use global::default_registry;
pub use memory::{MemoryStore, Record};
