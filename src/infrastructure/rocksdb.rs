use crate::domain::access::{AccessCode, Redemption};
use crate::domain::account::Account;
use crate::domain::ids::{AccountId, OrderId};
use crate::domain::money::Money;
use crate::domain::order::{Order, OrderState};
use crate::domain::ports::{AccessCodeStore, AccountStore, OrderStore};
use crate::error::StoreError;
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, Options};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

/// Column Family for account records.
pub const CF_ACCOUNTS: &str = "accounts";
/// Column Family for order records.
pub const CF_ORDERS: &str = "orders";
/// Column Family for wallet access codes.
pub const CF_ACCESS_CODES: &str = "access_codes";

/// A persistent store implementation using RocksDB.
///
/// Accounts, orders and access codes live in separate Column Families, keyed by their
/// identifier and encoded as JSON. Read-compare-write sequences (the compare-and-swap
/// updates and duplicate-checked inserts) run under a store-wide write gate so they are
/// atomic with respect to each other.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>` and gate).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
    write_gate: Arc<Mutex<()>>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path, creating the column
    /// families on first use.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let families = [CF_ACCOUNTS, CF_ORDERS, CF_ACCESS_CODES]
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()));

        let db = DB::open_cf_descriptors(&opts, path, families)
            .map_err(|e| StoreError::Unavailable(Box::new(e)))?;

        Ok(Self {
            db: Arc::new(db),
            write_gate: Arc::new(Mutex::new(())),
        })
    }

    fn cf(&self, name: &str) -> Result<&ColumnFamily, StoreError> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| StoreError::unavailable(format!("column family {name} not found")))
    }

    fn gate(&self) -> Result<MutexGuard<'_, ()>, StoreError> {
        self.write_gate
            .lock()
            .map_err(|_| StoreError::unavailable("write gate poisoned"))
    }

    fn read<T: DeserializeOwned>(&self, cf: &str, key: &str) -> Result<Option<T>, StoreError> {
        let bytes = self
            .db
            .get_pinned_cf(self.cf(cf)?, key.as_bytes())
            .map_err(|e| StoreError::Unavailable(Box::new(e)))?;
        bytes
            .map(|bytes| {
                serde_json::from_slice(&bytes).map_err(|e| {
                    StoreError::unavailable(format!("deserialization error in {cf}/{key}: {e}"))
                })
            })
            .transpose()
    }

    fn write<T: Serialize>(&self, cf: &str, key: &str, value: &T) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(value)
            .map_err(|e| StoreError::unavailable(format!("serialization error: {e}")))?;
        self.db
            .put_cf(self.cf(cf)?, key.as_bytes(), bytes)
            .map_err(|e| StoreError::Unavailable(Box::new(e)))
    }

    fn exists(&self, cf: &str, key: &str) -> Result<bool, StoreError> {
        self.db
            .get_pinned_cf(self.cf(cf)?, key.as_bytes())
            .map(|value| value.is_some())
            .map_err(|e| StoreError::Unavailable(Box::new(e)))
    }
}

#[async_trait]
impl AccountStore for RocksDBStore {
    async fn insert(&self, account: Account) -> Result<(), StoreError> {
        let _gate = self.gate()?;
        if self.exists(CF_ACCOUNTS, account.id.as_str())? {
            return Err(StoreError::Duplicate);
        }
        self.write(CF_ACCOUNTS, account.id.as_str(), &account)
    }

    async fn get(&self, id: &AccountId) -> Result<Option<Account>, StoreError> {
        self.read(CF_ACCOUNTS, id.as_str())
    }

    async fn update_balance(
        &self,
        id: &AccountId,
        new_balance: Money,
        expected: Money,
    ) -> Result<(), StoreError> {
        let _gate = self.gate()?;
        let mut account: Account = self
            .read(CF_ACCOUNTS, id.as_str())?
            .ok_or(StoreError::NotFound)?;
        if account.balance != expected {
            return Err(StoreError::Conflict);
        }
        account.balance = new_balance;
        self.write(CF_ACCOUNTS, id.as_str(), &account)
    }
}

#[async_trait]
impl OrderStore for RocksDBStore {
    async fn insert(&self, order: Order) -> Result<(), StoreError> {
        let _gate = self.gate()?;
        if self.exists(CF_ORDERS, order.id.as_str())? {
            return Err(StoreError::Duplicate);
        }
        self.write(CF_ORDERS, order.id.as_str(), &order)
    }

    async fn get(&self, id: &OrderId) -> Result<Option<Order>, StoreError> {
        self.read(CF_ORDERS, id.as_str())
    }

    async fn update_state(
        &self,
        id: &OrderId,
        new_state: OrderState,
        expected: OrderState,
    ) -> Result<(), StoreError> {
        let _gate = self.gate()?;
        let mut order: Order = self
            .read(CF_ORDERS, id.as_str())?
            .ok_or(StoreError::NotFound)?;
        if order.state() != expected {
            return Err(StoreError::Conflict);
        }
        order.apply_state(new_state);
        self.write(CF_ORDERS, id.as_str(), &order)
    }
}

#[async_trait]
impl AccessCodeStore for RocksDBStore {
    async fn put(&self, account: &AccountId, code: AccessCode) -> Result<(), StoreError> {
        let _gate = self.gate()?;
        self.write(CF_ACCESS_CODES, account.as_str(), &code)
    }

    async fn redeem(
        &self,
        account: &AccountId,
        entered: &str,
        now_ms: u64,
    ) -> Result<Redemption, StoreError> {
        let _gate = self.gate()?;
        let outcome = self
            .read::<AccessCode>(CF_ACCESS_CODES, account.as_str())?
            .map_or(Redemption::Missing, |code| code.redeem(entered, now_ms));
        if outcome.consumes() {
            self.db
                .delete_cf(self.cf(CF_ACCESS_CODES)?, account.as_str().as_bytes())
                .map_err(|e| StoreError::Unavailable(Box::new(e)))?;
        }
        Ok(outcome)
    }
}
