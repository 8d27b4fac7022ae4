//! In-memory record store backend.

use std::sync::{Arc, Mutex};

use mover_engine::Store;

use crate::error::{AppError, Result};

/// The engine store behind a mutex.
///
/// Every operation holds the lock for its whole unit of work, so row changes
/// and the aggregate refresh that follows them are never observed apart.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    store: Arc<Mutex<Store>>,
}

impl MemoryBackend {
    pub fn new(store: Store) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
        }
    }

    /// Run a fallible engine operation under the store lock.
    pub fn with_store<T>(
        &self,
        op: impl FnOnce(&mut Store) -> mover_engine::Result<T>,
    ) -> Result<T> {
        let mut store = self
            .store
            .lock()
            .map_err(|_| AppError::Internal("record store lock poisoned".into()))?;
        Ok(op(&mut store)?)
    }

    /// Run a read-only engine operation under the store lock.
    pub fn read<T>(&self, op: impl FnOnce(&Store) -> T) -> Result<T> {
        let store = self
            .store
            .lock()
            .map_err(|_| AppError::Internal("record store lock poisoned".into()))?;
        Ok(op(&store))
    }
}
