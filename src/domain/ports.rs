use super::access::{AccessCode, Redemption};
use super::account::Account;
use super::ids::{AccountId, OrderId};
use super::money::Money;
use super::notice::Notice;
use super::order::{Order, OrderState};
use crate::error::{NotifyError, StoreError};
use async_trait::async_trait;
use std::sync::Arc;

/// Account records and their balance field.
///
/// `update_balance` is a compare-and-swap: it only writes when the stored balance still
/// equals `expected`, and reports [`StoreError::Conflict`] otherwise.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn insert(&self, account: Account) -> Result<(), StoreError>;
    async fn get(&self, id: &AccountId) -> Result<Option<Account>, StoreError>;
    async fn update_balance(
        &self,
        id: &AccountId,
        new_balance: Money,
        expected: Money,
    ) -> Result<(), StoreError>;
}

/// Order records and their status/payment pair.
///
/// `update_state` follows the same compare-and-swap contract as
/// [`AccountStore::update_balance`].
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn insert(&self, order: Order) -> Result<(), StoreError>;
    async fn get(&self, id: &OrderId) -> Result<Option<Order>, StoreError>;
    async fn update_state(
        &self,
        id: &OrderId,
        new_state: OrderState,
        expected: OrderState,
    ) -> Result<(), StoreError>;
}

/// Time-bounded wallet access codes, one per account.
///
/// `redeem` checks the entered code and, when the outcome consumes it, removes it in the
/// same atomic step. A code is accepted at most once.
#[async_trait]
pub trait AccessCodeStore: Send + Sync {
    async fn put(&self, account: &AccountId, code: AccessCode) -> Result<(), StoreError>;
    async fn redeem(
        &self,
        account: &AccountId,
        entered: &str,
        now_ms: u64,
    ) -> Result<Redemption, StoreError>;
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notice: &Notice) -> Result<(), NotifyError>;
}

pub type SharedAccountStore = Arc<dyn AccountStore>;
pub type SharedOrderStore = Arc<dyn OrderStore>;
pub type SharedAccessCodeStore = Arc<dyn AccessCodeStore>;
pub type SharedNotifier = Arc<dyn Notifier>;
