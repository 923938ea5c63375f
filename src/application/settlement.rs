use super::locks::AccountLocks;
use crate::domain::account::Account;
use crate::domain::ids::{AccountId, OrderId};
use crate::domain::money::{Amount, Money};
use crate::domain::notice::{Notice, Recipient, WalletOperation};
use crate::domain::order::{Order, OrderState, OrderStatus};
use crate::domain::ports::{SharedAccountStore, SharedNotifier, SharedOrderStore};
use crate::error::{Result, StoreError, WalletError};
use serde::Serialize;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{error, info, warn};

/// Outcome of a successful settlement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SettlementReceipt {
    pub order_id: OrderId,
    pub account_id: AccountId,
    pub debited: Money,
    pub new_balance: Money,
    pub order_status: OrderStatus,
}

/// Outcome of a successful top-up or admin adjustment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BalanceReceipt {
    pub account_id: AccountId,
    pub operation: WalletOperation,
    pub amount: Money,
    pub new_balance: Money,
}

/// A settlement whose balance write landed but whose order write, and the compensating
/// balance restore, both failed. The account has been debited for an order still shown as
/// unpaid until someone resolves it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciliationCase {
    pub order_id: OrderId,
    pub account_id: AccountId,
    pub debited: Money,
    pub detail: String,
}

/// Moves money out of (and into) wallets.
///
/// `settle` is the only operation that debits a wallet for an order. It runs the whole
/// read-balance, compare, write-balance, write-order sequence inside the per-account
/// critical section from [`AccountLocks`], and both writes are compare-and-swap against
/// the values read inside that section. Notifications go out after the section is left
/// and never influence the result.
pub struct SettlementEngine {
    accounts: SharedAccountStore,
    orders: SharedOrderStore,
    notifier: SharedNotifier,
    locks: AccountLocks,
    unreconciled: Mutex<Vec<ReconciliationCase>>,
}

impl SettlementEngine {
    /// Creates a new `SettlementEngine`.
    ///
    /// # Arguments
    ///
    /// * `accounts` - The store holding wallet balances.
    /// * `orders` - The store holding order status and payment state.
    /// * `notifier` - Receives wallet notices after each committed change.
    /// * `lock_wait` - How long an operation waits for its account before giving up.
    pub fn new(
        accounts: SharedAccountStore,
        orders: SharedOrderStore,
        notifier: SharedNotifier,
        lock_wait: Duration,
    ) -> Self {
        Self {
            accounts,
            orders,
            notifier,
            locks: AccountLocks::new(lock_wait),
            unreconciled: Mutex::new(Vec::new()),
        }
    }

    pub fn locks(&self) -> &AccountLocks {
        &self.locks
    }

    /// Pays for an order out of its owner's wallet.
    ///
    /// The amount is always the order's stored total. Repeating the call for a paid
    /// order returns [`WalletError::AlreadySettled`] and moves no money.
    pub async fn settle(&self, order_id: &OrderId) -> Result<SettlementReceipt> {
        // The owning account never changes, so it is safe to read it before locking.
        let owner = self.load_order(order_id).await?.account_id;
        let guard = self.locks.acquire(&owner).await?;
        let outcome = self.settle_locked(order_id, &owner).await;
        drop(guard);

        match outcome {
            Ok((receipt, recipient)) => {
                info!(
                    order = %receipt.order_id,
                    account = %receipt.account_id,
                    debited = %receipt.debited,
                    new_balance = %receipt.new_balance,
                    "order settled"
                );
                self.dispatch(Notice::Wallet {
                    to: recipient,
                    operation: WalletOperation::Debit,
                    amount: receipt.debited,
                    new_balance: receipt.new_balance,
                    reason: Some(format!("Payment for order {}", receipt.order_id)),
                });
                Ok(receipt)
            }
            Err(e) => {
                info!(order = %order_id, reason = e.reason(), "settlement refused: {e}");
                Err(e)
            }
        }
    }

    async fn settle_locked(
        &self,
        order_id: &OrderId,
        owner: &AccountId,
    ) -> Result<(SettlementReceipt, Recipient)> {
        // Re-read inside the critical section: the pre-lock read may be stale.
        let order = self.load_order(order_id).await?;
        let observed = order.state();
        if observed.is_settled() {
            return Err(WalletError::AlreadySettled(order_id.clone()));
        }
        if observed.status == OrderStatus::Cancelled {
            return Err(WalletError::OrderCancelled(order_id.clone()));
        }

        let mut account = self.load_account(owner).await?;
        let previous = account.balance;
        account.debit(order.total())?;

        self.write_balance(&account.id, account.balance, previous)
            .await?;

        if let Err(e) = self
            .orders
            .update_state(order_id, OrderState::SETTLED, observed)
            .await
        {
            return Err(self.compensate(&order, &account, previous, e).await);
        }

        let receipt = SettlementReceipt {
            order_id: order_id.clone(),
            account_id: account.id.clone(),
            debited: order.total(),
            new_balance: account.balance,
            order_status: OrderState::SETTLED.status,
        };
        Ok((receipt, Recipient::from(&account)))
    }

    /// Puts the balance back after the order write failed, so the settlement leaves no
    /// trace. If even that fails the case is flagged for reconciliation.
    async fn compensate(
        &self,
        order: &Order,
        debited: &Account,
        previous: Money,
        cause: StoreError,
    ) -> WalletError {
        warn!(order = %order.id, account = %debited.id, "order write failed after debit: {cause}");

        match self
            .accounts
            .update_balance(&debited.id, previous, debited.balance)
            .await
        {
            Ok(()) => match cause {
                StoreError::NotFound => WalletError::OrderNotFound(order.id.clone()),
                StoreError::Conflict => WalletError::Busy(format!("order {}", order.id)),
                other => WalletError::StoreUnavailable(other),
            },
            Err(restore_error) => {
                let case = ReconciliationCase {
                    order_id: order.id.clone(),
                    account_id: debited.id.clone(),
                    debited: order.total(),
                    detail: format!("order write: {cause}; balance restore: {restore_error}"),
                };
                error!(
                    order = %case.order_id,
                    account = %case.account_id,
                    debited = %case.debited,
                    detail = %case.detail,
                    "settlement needs reconciliation"
                );
                self.flag(case);
                WalletError::ReconciliationRequired(order.id.clone())
            }
        }
    }

    /// Credits a wallet (student top-up).
    pub async fn top_up(&self, account: &AccountId, amount: Amount) -> Result<BalanceReceipt> {
        self.adjust(account, WalletOperation::Credit, amount, None)
            .await
    }

    /// Credits or debits a wallet outside of an order, under the same per-account
    /// critical section as settlement.
    pub async fn adjust(
        &self,
        account_id: &AccountId,
        operation: WalletOperation,
        amount: Amount,
        reason: Option<String>,
    ) -> Result<BalanceReceipt> {
        // Only existing accounts get a lock slot; the record is read again under the lock.
        self.load_account(account_id).await?;
        let guard = self.locks.acquire(account_id).await?;
        let mut account = self.load_account(account_id).await?;
        let previous = account.balance;
        match operation {
            WalletOperation::Credit => account.credit(amount.money())?,
            WalletOperation::Debit => account.debit(amount.money())?,
        }
        self.write_balance(account_id, account.balance, previous)
            .await?;
        drop(guard);

        info!(
            account = %account_id,
            ?operation,
            amount = %amount.money(),
            new_balance = %account.balance,
            "wallet adjusted"
        );
        self.dispatch(Notice::Wallet {
            to: Recipient::from(&account),
            operation,
            amount: amount.money(),
            new_balance: account.balance,
            reason,
        });

        Ok(BalanceReceipt {
            account_id: account_id.clone(),
            operation,
            amount: amount.money(),
            new_balance: account.balance,
        })
    }

    pub async fn balance(&self, account: &AccountId) -> Result<Money> {
        Ok(self.load_account(account).await?.balance)
    }

    /// Settlements flagged as partially applied.
    pub fn pending_reconciliation(&self) -> Vec<ReconciliationCase> {
        match self.unreconciled.lock() {
            Ok(cases) => cases.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn flag(&self, case: ReconciliationCase) {
        match self.unreconciled.lock() {
            Ok(mut cases) => cases.push(case),
            Err(poisoned) => poisoned.into_inner().push(case),
        }
    }

    fn dispatch(&self, notice: Notice) {
        let notifier = Arc::clone(&self.notifier);
        tokio::spawn(async move {
            if let Err(e) = notifier.notify(&notice).await {
                warn!(account = %notice.recipient().account_id, "{e}");
            }
        });
    }

    async fn load_order(&self, id: &OrderId) -> Result<Order> {
        self.orders
            .get(id)
            .await
            .map_err(WalletError::StoreUnavailable)?
            .ok_or_else(|| WalletError::OrderNotFound(id.clone()))
    }

    async fn load_account(&self, id: &AccountId) -> Result<Account> {
        self.accounts
            .get(id)
            .await
            .map_err(WalletError::StoreUnavailable)?
            .ok_or_else(|| WalletError::AccountNotFound(id.clone()))
    }

    async fn write_balance(&self, id: &AccountId, new_balance: Money, expected: Money) -> Result<()> {
        match self.accounts.update_balance(id, new_balance, expected).await {
            Ok(()) => Ok(()),
            Err(StoreError::NotFound) => Err(WalletError::AccountNotFound(id.clone())),
            Err(StoreError::Conflict) => {
                warn!(account = %id, "balance changed outside the account lock");
                Err(WalletError::Busy(format!("account {id}")))
            }
            Err(e) => Err(WalletError::StoreUnavailable(e)),
        }
    }
}
