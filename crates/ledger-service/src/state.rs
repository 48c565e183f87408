//! Application state.

use std::sync::Arc;

use ledger_engine::TransactionEngine;
use ledger_store::RocksStore;

use crate::config::ServiceConfig;

/// Application state shared across handlers.
///
/// The engine owns the only mutation path; handlers use the store handle
/// directly for read-side queries (entry listings, activity log).
#[derive(Clone)]
pub struct AppState {
    /// The storage backend.
    pub store: Arc<RocksStore>,

    /// The balance transaction engine.
    pub engine: Arc<TransactionEngine<RocksStore>>,

    /// Service configuration.
    pub config: ServiceConfig,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(store: Arc<RocksStore>, config: ServiceConfig) -> Self {
        let engine = Arc::new(TransactionEngine::new(Arc::clone(&store)));

        Self {
            store,
            engine,
            config,
        }
    }
}
