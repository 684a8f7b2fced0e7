//! Application state for the payroll API.
//!
//! Handlers share the loaded configuration and one store behind an async
//! mutex. Every mutating handler holds the lock for the whole operation, so
//! lifecycle operations on the store never interleave.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::config::ConfigLoader;
use crate::store::PayrollStore;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// The loaded payroll configuration.
    config: Arc<ConfigLoader>,
    /// The system of record.
    store: Arc<Mutex<PayrollStore>>,
}

impl AppState {
    /// Creates application state with an empty store.
    pub fn new(config: ConfigLoader) -> Self {
        Self::with_store(config, PayrollStore::new())
    }

    /// Creates application state around an existing store.
    pub fn with_store(config: ConfigLoader, store: PayrollStore) -> Self {
        Self {
            config: Arc::new(config),
            store: Arc::new(Mutex::new(store)),
        }
    }

    /// Returns a reference to the configuration loader.
    pub fn config(&self) -> &ConfigLoader {
        &self.config
    }

    /// Returns the locked store handle.
    pub fn store(&self) -> &Mutex<PayrollStore> {
        &self.store
    }
}
