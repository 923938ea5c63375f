use foodcard::domain::account::Account;
use foodcard::domain::ids::{AccountId, OrderId};
use foodcard::domain::money::Money;
use foodcard::domain::order::{LineItem, MealType, Order, OrderState};
use foodcard::domain::ports::{SharedAccountStore, SharedOrderStore};
use foodcard::infrastructure::in_memory::{InMemoryAccountStore, InMemoryOrderStore};
use rust_decimal_macros::dec;
use std::sync::Arc;

#[tokio::test]
async fn test_stores_as_trait_objects() {
    let account_store: SharedAccountStore = Arc::new(InMemoryAccountStore::new());
    let order_store: SharedOrderStore = Arc::new(InMemoryOrderStore::new());

    let owner = AccountId::parse("stu-1").unwrap();
    let account = Account::new(owner.clone(), "Asha", "asha@campus.edu")
        .with_balance(Money::from_minor(10_000));
    let order = Order::place(
        OrderId::parse("ord-1").unwrap(),
        owner.clone(),
        MealType::Breakfast,
        vec![LineItem::new("Idli", dec!(30), 1).unwrap()],
    )
    .unwrap();

    // Verify Send + Sync by spawning tasks
    let accounts = Arc::clone(&account_store);
    let as_handle = tokio::spawn(async move {
        accounts.insert(account).await.unwrap();
        accounts
            .update_balance(
                &AccountId::parse("stu-1").unwrap(),
                Money::from_minor(7_000),
                Money::from_minor(10_000),
            )
            .await
            .unwrap();
        accounts.get(&AccountId::parse("stu-1").unwrap()).await.unwrap().unwrap()
    });

    let orders = Arc::clone(&order_store);
    let os_handle = tokio::spawn(async move {
        orders.insert(order).await.unwrap();
        orders
            .update_state(&OrderId::parse("ord-1").unwrap(), OrderState::SETTLED, OrderState::OPEN)
            .await
            .unwrap();
        orders.get(&OrderId::parse("ord-1").unwrap()).await.unwrap().unwrap()
    });

    let retrieved_account = as_handle.await.unwrap();
    assert_eq!(retrieved_account.balance, Money::from_minor(7_000));

    let retrieved_order = os_handle.await.unwrap();
    assert_eq!(retrieved_order.state(), OrderState::SETTLED);
    assert_eq!(retrieved_order.total(), Money::from_minor(3_000));
}
