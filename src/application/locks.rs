use crate::domain::ids::AccountId;
use crate::error::{Result, WalletError};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::warn;

/// Per-account critical sections.
///
/// Every balance write (settlement, top-up, admin adjustment) runs while holding the
/// guard for its account. Operations on different accounts never contend. Waiting is
/// bounded: past `wait` the caller gets [`WalletError::Busy`] instead of queueing forever.
#[derive(Clone)]
pub struct AccountLocks {
    slots: Arc<DashMap<AccountId, Arc<Mutex<()>>>>,
    wait: Duration,
}

/// Held for the duration of one account's critical section; released on drop.
#[must_use]
pub struct AccountGuard {
    account: AccountId,
    _held: OwnedMutexGuard<()>,
}

impl AccountGuard {
    pub fn account(&self) -> &AccountId {
        &self.account
    }
}

impl AccountLocks {
    pub fn new(wait: Duration) -> Self {
        Self {
            slots: Arc::new(DashMap::new()),
            wait,
        }
    }

    #[cfg(test)]
    pub(crate) fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub async fn acquire(&self, account: &AccountId) -> Result<AccountGuard> {
        // Clone the slot out so the map shard is not locked while we wait.
        let slot = Arc::clone(self.slots.entry(account.clone()).or_default().value());

        match tokio::time::timeout(self.wait, slot.lock_owned()).await {
            Ok(held) => Ok(AccountGuard {
                account: account.clone(),
                _held: held,
            }),
            Err(_) => {
                warn!(%account, wait_ms = self.wait.as_millis() as u64, "account lock wait timed out");
                Err(WalletError::Busy(format!("account {account}")))
            }
        }
    }
}
