//! Session handling for Locas.
//!
//! `context` holds the pure per-turn rules; the stores implement
//! `locas_core::SessionStore`. `build_store` picks one from configuration.

pub mod context;
pub mod file_backend;
pub mod in_memory;

use std::sync::Arc;

use locas_config::{SessionBackend, SessionConfig};
use locas_core::session::SessionStore;

pub use context::{has_back_reference, record_turn, resolve_location_for_turn, BACK_REFERENCE_PHRASES};
pub use file_backend::FileSessionStore;
pub use in_memory::InMemorySessionStore;

/// Create the configured session store.
pub fn build_store(config: &SessionConfig) -> Arc<dyn SessionStore> {
    match config.backend {
        SessionBackend::Memory => Arc::new(InMemorySessionStore::new()),
        SessionBackend::File => Arc::new(FileSessionStore::new(config.resolved_dir())),
    }
}
