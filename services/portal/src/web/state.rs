//! services/portal/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::adapters::RestBackend;
use crate::config::Config;
use classroom_core::ports::{ClassroomBackend, KeyValueStorage};
use classroom_core::{CatalogStore, RouteTable, SeedData, SessionStore};
use std::sync::Arc;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<SessionStore>,
    pub catalog: Arc<CatalogStore>,
    pub routes: Arc<RouteTable>,
    /// The same storage the session writes through to; settings live here too.
    pub storage: Arc<dyn KeyValueStorage>,
    pub backend: Arc<dyn ClassroomBackend>,
}

impl AppState {
    /// Wires the stores and the backend client around `storage`. Only the
    /// backend base URL is read from `config`.
    ///
    /// The session starts in the loading state; the caller is responsible for
    /// running `session.restore()` once.
    pub fn new(config: &Config, storage: Arc<dyn KeyValueStorage>, seed: SeedData) -> Self {
        let session = Arc::new(SessionStore::new(storage.clone()));
        let backend = Arc::new(RestBackend::new(
            config.api_base_url.clone(),
            session.clone(),
        ));

        Self {
            session,
            catalog: Arc::new(CatalogStore::new(seed)),
            routes: Arc::new(RouteTable::classroom()),
            storage,
            backend,
        }
    }
}
