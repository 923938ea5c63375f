#![allow(dead_code)]

use async_trait::async_trait;
use foodcard::application::Services;
use foodcard::application::orders::{LineItemInput, OrderDesk, PlaceOrder};
use foodcard::config::Config;
use foodcard::domain::account::Account;
use foodcard::domain::ids::{AccountId, OrderId};
use foodcard::domain::money::Money;
use foodcard::domain::order::{MealType, Order, OrderState};
use foodcard::domain::ports::{AccountStore, OrderStore, SharedNotifier};
use foodcard::error::StoreError;
use foodcard::infrastructure::Stores;
use foodcard::infrastructure::in_memory::InMemoryAccessCodeStore;
use foodcard::infrastructure::notifier::LogNotifier;
use rust_decimal::Decimal;
use std::io::Error;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

pub const STUDENT: &str = "stu-1";

pub fn account_id(raw: &str) -> AccountId {
    AccountId::parse(raw).unwrap()
}

pub fn order_id(raw: &str) -> OrderId {
    OrderId::parse(raw).unwrap()
}

pub fn config(lock_timeout: Duration) -> Config {
    Config {
        lock_timeout,
        ..Config::default()
    }
}

/// In-memory services with one account holding `balance_minor` and one pending
/// single-item order per `(order id, price)` pair, all owned by that account.
pub async fn seeded(balance_minor: u64, orders: &[(&str, Decimal)]) -> (Stores, Services) {
    seeded_with(config(Duration::from_secs(5)), balance_minor, orders).await
}

pub async fn seeded_with(
    config: Config,
    balance_minor: u64,
    orders: &[(&str, Decimal)],
) -> (Stores, Services) {
    let stores = Stores::in_memory();
    let notifier: SharedNotifier = Arc::new(LogNotifier);
    let services = Services::new(&stores, notifier, &config);

    stores
        .accounts
        .insert(
            Account::new(account_id(STUDENT), "Asha", "asha@campus.edu")
                .with_balance(Money::from_minor(balance_minor)),
        )
        .await
        .unwrap();

    let desk = OrderDesk::new(Arc::clone(&stores.accounts), Arc::clone(&stores.orders));
    for (id, price) in orders {
        desk.place_with_id(order_id(id), lunch(STUDENT, *price))
            .await
            .unwrap();
    }
    (stores, services)
}

pub fn lunch(account: &str, price: Decimal) -> PlaceOrder {
    PlaceOrder {
        account_id: account_id(account),
        order_type: MealType::Lunch,
        items: vec![LineItemInput {
            name: "Thali".to_string(),
            price,
            quantity: 1,
        }],
    }
}

/// Seed file with one account holding `balance_minor` and one order per `(id, price)`.
pub fn write_seed(path: &Path, balance_minor: u64, orders: &[(&str, &str)]) -> Result<(), Error> {
    let orders: Vec<_> = orders
        .iter()
        .map(|(id, price)| {
            serde_json::json!({
                "id": id,
                "accountId": STUDENT,
                "orderType": "lunch",
                "items": [{"name": "Thali", "price": price}]
            })
        })
        .collect();
    let seed = serde_json::json!({
        "accounts": [{"id": STUDENT, "name": "Asha", "email": "asha@campus.edu", "balance": balance_minor}],
        "orders": orders,
    });
    std::fs::write(path, seed.to_string())
}

/// Scanner CSV with one `station,payload` row per payload.
pub fn write_scans(path: &Path, payloads: &[&str]) -> Result<(), Error> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(["station", "payload"])?;
    for payload in payloads {
        wtr.write_record(["gate-1", payload])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Counts every call and answers like an unreachable database.
#[derive(Default)]
pub struct CountingOutage {
    pub calls: AtomicUsize,
}

impl CountingOutage {
    fn hit(&self) -> StoreError {
        self.calls.fetch_add(1, Ordering::SeqCst);
        StoreError::unavailable("connection refused")
    }
}

#[async_trait]
impl AccountStore for CountingOutage {
    async fn insert(&self, _account: Account) -> Result<(), StoreError> {
        Err(self.hit())
    }
    async fn get(&self, _id: &AccountId) -> Result<Option<Account>, StoreError> {
        Err(self.hit())
    }
    async fn update_balance(&self, _: &AccountId, _: Money, _: Money) -> Result<(), StoreError> {
        Err(self.hit())
    }
}

#[async_trait]
impl OrderStore for CountingOutage {
    async fn insert(&self, _order: Order) -> Result<(), StoreError> {
        Err(self.hit())
    }
    async fn get(&self, _id: &OrderId) -> Result<Option<Order>, StoreError> {
        Err(self.hit())
    }
    async fn update_state(&self, _: &OrderId, _: OrderState, _: OrderState) -> Result<(), StoreError> {
        Err(self.hit())
    }
}

/// Services whose account and order stores are both unreachable.
pub fn unreachable_services() -> Services {
    let outage = Arc::new(CountingOutage::default());
    let stores = Stores {
        accounts: outage.clone(),
        orders: outage,
        access_codes: Arc::new(InMemoryAccessCodeStore::new()),
    };
    let notifier: SharedNotifier = Arc::new(LogNotifier);
    Services::new(&stores, notifier, &Config::default())
}
