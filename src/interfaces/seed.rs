use crate::application::orders::{OrderDesk, PlaceOrder};
use crate::domain::account::Account;
use crate::domain::ids::OrderId;
use crate::domain::ports::SharedAccountStore;
use crate::error::{StoreError, WalletError};
use miette::Diagnostic;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Error, Diagnostic, Debug)]
pub enum SeedError {
    #[error("cannot read seed file {path}: {source}")]
    #[diagnostic(code(foodcard::seed::io))]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid seed file {path}: {source}")]
    #[diagnostic(code(foodcard::seed::format))]
    Format {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("cannot seed account: {0}")]
    #[diagnostic(code(foodcard::seed::account))]
    Account(#[source] StoreError),
    #[error("cannot seed order {id}: {source}")]
    #[diagnostic(code(foodcard::seed::order))]
    Order { id: OrderId, source: WalletError },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSeed {
    pub id: OrderId,
    #[serde(flatten)]
    pub order: PlaceOrder,
}

/// Initial accounts and orders, loaded from JSON at startup.
///
/// ```json
/// {
///   "accounts": [{"id": "stu-1", "name": "Asha", "email": "asha@campus.edu", "balance": 10000}],
///   "orders": [{"id": "ord-1", "accountId": "stu-1", "orderType": "lunch",
///               "items": [{"name": "Thali", "price": 60}]}]
/// }
/// ```
///
/// Account balances are in minor units; item prices are decimal.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeedFile {
    #[serde(default)]
    pub accounts: Vec<Account>,
    #[serde(default)]
    pub orders: Vec<OrderSeed>,
}

impl SeedFile {
    pub fn load(path: &Path) -> Result<Self, SeedError> {
        let raw = std::fs::read_to_string(path).map_err(|source| SeedError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| SeedError::Format {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Inserts everything; records that already exist (e.g. in a reopened database)
    /// are left untouched.
    pub async fn apply(self, accounts: &SharedAccountStore, desk: &OrderDesk) -> Result<(), SeedError> {
        let (mut new_accounts, mut new_orders) = (0usize, 0usize);
        for account in self.accounts {
            match accounts.insert(account).await {
                Ok(()) => new_accounts += 1,
                Err(StoreError::Duplicate) => {}
                Err(e) => return Err(SeedError::Account(e)),
            }
        }
        for seed in self.orders {
            if desk.get(&seed.id).await.is_ok() {
                continue;
            }
            desk.place_with_id(seed.id.clone(), seed.order)
                .await
                .map_err(|source| SeedError::Order {
                    id: seed.id,
                    source,
                })?;
            new_orders += 1;
        }
        info!(accounts = new_accounts, orders = new_orders, "seed data applied");
        Ok(())
    }
}
