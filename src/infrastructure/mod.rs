//! Storage and delivery adapters for the domain ports.

pub mod in_memory;
pub mod notifier;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;

use crate::domain::ports::{SharedAccessCodeStore, SharedAccountStore, SharedOrderStore};
use crate::error::StoreError;
use in_memory::{InMemoryAccessCodeStore, InMemoryAccountStore, InMemoryOrderStore};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// One backend's worth of store handles.
#[derive(Clone)]
pub struct Stores {
    pub accounts: SharedAccountStore,
    pub orders: SharedOrderStore,
    pub access_codes: SharedAccessCodeStore,
}

impl Stores {
    pub fn in_memory() -> Self {
        Self {
            accounts: Arc::new(InMemoryAccountStore::new()),
            orders: Arc::new(InMemoryOrderStore::new()),
            access_codes: Arc::new(InMemoryAccessCodeStore::new()),
        }
    }

    #[cfg(feature = "storage-rocksdb")]
    pub fn rocksdb(path: &Path) -> Result<Self, StoreError> {
        let store = rocksdb::RocksDBStore::open(path)?;
        Ok(Self {
            accounts: Arc::new(store.clone()),
            orders: Arc::new(store.clone()),
            access_codes: Arc::new(store),
        })
    }

    /// Persistent stores when a path is given and RocksDB support is compiled in,
    /// in-memory stores otherwise.
    pub fn open(db_path: Option<&Path>) -> Result<Self, StoreError> {
        match db_path {
            #[cfg(feature = "storage-rocksdb")]
            Some(path) => {
                info!(path = %path.display(), "opening RocksDB storage");
                Self::rocksdb(path)
            }
            #[cfg(not(feature = "storage-rocksdb"))]
            Some(path) => {
                tracing::warn!(
                    path = %path.display(),
                    "WARNING: Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
                );
                Ok(Self::in_memory())
            }
            None => {
                info!("using in-memory storage");
                Ok(Self::in_memory())
            }
        }
    }
}
