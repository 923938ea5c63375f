//! Application layer containing the wallet use cases.
//!
//! [`SettlementEngine`](settlement::SettlementEngine) owns every balance mutation and
//! serializes them per account through [`AccountLocks`](locks::AccountLocks).
//! [`OrderDesk`](orders::OrderDesk) and [`WalletAccess`](wallet_access::WalletAccess)
//! cover the order and access-code flows around it.

pub mod locks;
pub mod orders;
pub mod settlement;
pub mod wallet_access;

use crate::config::Config;
use crate::domain::ports::SharedNotifier;
use crate::infrastructure::Stores;
use orders::OrderDesk;
use settlement::SettlementEngine;
use std::sync::Arc;
use wallet_access::WalletAccess;

/// The use cases wired to one set of stores, shared by the HTTP and CLI front ends.
#[derive(Clone)]
pub struct Services {
    pub engine: Arc<SettlementEngine>,
    pub orders: Arc<OrderDesk>,
    pub access: Arc<WalletAccess>,
}

impl Services {
    pub fn new(stores: &Stores, notifier: SharedNotifier, config: &Config) -> Self {
        Self {
            engine: Arc::new(SettlementEngine::new(
                Arc::clone(&stores.accounts),
                Arc::clone(&stores.orders),
                Arc::clone(&notifier),
                config.lock_timeout,
            )),
            orders: Arc::new(OrderDesk::new(
                Arc::clone(&stores.accounts),
                Arc::clone(&stores.orders),
            )),
            access: Arc::new(WalletAccess::new(
                Arc::clone(&stores.accounts),
                Arc::clone(&stores.access_codes),
                notifier,
                config.otp_ttl,
            )),
        }
    }
}
