//! Engine operations: attribute resolution and idempotent creation.

pub mod attr_ops;
pub mod create_ops;

pub use attr_ops::resolve_attributes;
pub use create_ops::create_entity;
