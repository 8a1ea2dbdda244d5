use std::sync::OnceLock;

use fabrik_core::Registry;

use crate::memory::MemoryStore;

static DEFAULT: OnceLock<Registry<MemoryStore>> = OnceLock::new();

/// Get the process-wide default registry, created lazily on first use
///
/// Backed by a fresh `MemoryStore`. The registry's internal maps are
/// mutex-guarded, but create-or-find sequences are not atomic across them:
/// the default instance is documented single-writer, and concurrent mutation
/// from multiple threads can race duplicate creates. Code that needs
/// isolation (tests in particular) should build its own `Registry` instead.
pub fn default_registry() -> &'static Registry<MemoryStore> {
    DEFAULT.get_or_init(|| Registry::new(MemoryStore::new()))
}
