use crate::domain::access::{AccessCode, Redemption};
use crate::domain::account::Account;
use crate::domain::ids::{AccountId, OrderId};
use crate::domain::money::Money;
use crate::domain::order::{Order, OrderState};
use crate::domain::ports::{AccessCodeStore, AccountStore, OrderStore};
use crate::error::StoreError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory store for accounts.
///
/// Uses `Arc<RwLock<HashMap<AccountId, Account>>>`; the compare-and-swap in
/// `update_balance` happens under the write lock. Clones share the same map.
#[derive(Default, Clone)]
pub struct InMemoryAccountStore {
    accounts: Arc<RwLock<HashMap<AccountId, Account>>>,
}

impl InMemoryAccountStore {
    /// Creates a new, empty in-memory account store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn insert(&self, account: Account) -> Result<(), StoreError> {
        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(&account.id) {
            return Err(StoreError::Duplicate);
        }
        accounts.insert(account.id.clone(), account);
        Ok(())
    }

    async fn get(&self, id: &AccountId) -> Result<Option<Account>, StoreError> {
        let accounts = self.accounts.read().await;
        Ok(accounts.get(id).cloned())
    }

    async fn update_balance(
        &self,
        id: &AccountId,
        new_balance: Money,
        expected: Money,
    ) -> Result<(), StoreError> {
        let mut accounts = self.accounts.write().await;
        let account = accounts.get_mut(id).ok_or(StoreError::NotFound)?;
        if account.balance != expected {
            return Err(StoreError::Conflict);
        }
        account.balance = new_balance;
        Ok(())
    }
}

/// A thread-safe in-memory store for orders.
#[derive(Default, Clone)]
pub struct InMemoryOrderStore {
    orders: Arc<RwLock<HashMap<OrderId, Order>>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn insert(&self, order: Order) -> Result<(), StoreError> {
        let mut orders = self.orders.write().await;
        if orders.contains_key(&order.id) {
            return Err(StoreError::Duplicate);
        }
        orders.insert(order.id.clone(), order);
        Ok(())
    }

    async fn get(&self, id: &OrderId) -> Result<Option<Order>, StoreError> {
        let orders = self.orders.read().await;
        Ok(orders.get(id).cloned())
    }

    async fn update_state(
        &self,
        id: &OrderId,
        new_state: OrderState,
        expected: OrderState,
    ) -> Result<(), StoreError> {
        let mut orders = self.orders.write().await;
        let order = orders.get_mut(id).ok_or(StoreError::NotFound)?;
        if order.state() != expected {
            return Err(StoreError::Conflict);
        }
        order.apply_state(new_state);
        Ok(())
    }
}

/// Access codes kept in memory; check and removal share one write lock.
#[derive(Default, Clone)]
pub struct InMemoryAccessCodeStore {
    codes: Arc<RwLock<HashMap<AccountId, AccessCode>>>,
}

impl InMemoryAccessCodeStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccessCodeStore for InMemoryAccessCodeStore {
    async fn put(&self, account: &AccountId, code: AccessCode) -> Result<(), StoreError> {
        self.codes.write().await.insert(account.clone(), code);
        Ok(())
    }

    async fn redeem(
        &self,
        account: &AccountId,
        entered: &str,
        now_ms: u64,
    ) -> Result<Redemption, StoreError> {
        let mut codes = self.codes.write().await;
        let outcome = codes
            .get(account)
            .map_or(Redemption::Missing, |code| code.redeem(entered, now_ms));
        if outcome.consumes() {
            codes.remove(account);
        }
        Ok(outcome)
    }
}
