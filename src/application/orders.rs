use crate::domain::ids::{AccountId, OrderId};
use crate::domain::order::{LineItem, MealType, Order, OrderStatus};
use crate::domain::ports::{SharedAccountStore, SharedOrderStore};
use crate::error::{Result, StoreError, WalletError};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;

/// Unvalidated line item as it arrives in a request body or seed file.
#[derive(Debug, Clone, Deserialize)]
pub struct LineItemInput {
    pub name: String,
    pub price: Decimal,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

fn default_quantity() -> u32 {
    1
}

impl TryFrom<LineItemInput> for LineItem {
    type Error = WalletError;

    fn try_from(input: LineItemInput) -> Result<Self> {
        LineItem::new(input.name, input.price, input.quantity)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrder {
    pub account_id: AccountId,
    pub order_type: MealType,
    pub items: Vec<LineItemInput>,
}

/// Order placement and staff-side status progression.
///
/// Payment never happens here; orders leave this desk pending and are paid through
/// [`SettlementEngine::settle`](super::settlement::SettlementEngine::settle).
pub struct OrderDesk {
    accounts: SharedAccountStore,
    orders: SharedOrderStore,
}

impl OrderDesk {
    pub fn new(accounts: SharedAccountStore, orders: SharedOrderStore) -> Self {
        Self { accounts, orders }
    }

    pub async fn place(&self, request: PlaceOrder) -> Result<Order> {
        self.place_with_id(OrderId::generate(), request).await
    }

    pub async fn place_with_id(&self, id: OrderId, request: PlaceOrder) -> Result<Order> {
        let items = request
            .items
            .into_iter()
            .map(LineItem::try_from)
            .collect::<Result<Vec<_>>>()?;

        if self
            .accounts
            .get(&request.account_id)
            .await
            .map_err(WalletError::StoreUnavailable)?
            .is_none()
        {
            return Err(WalletError::AccountNotFound(request.account_id));
        }

        let order = Order::place(id, request.account_id, request.order_type, items)?;
        self.orders.insert(order.clone()).await.map_err(|e| match e {
            StoreError::Duplicate => {
                WalletError::Validation(format!("order {} already exists", order.id))
            }
            other => WalletError::StoreUnavailable(other),
        })?;

        info!(order = %order.id, account = %order.account_id, total = %order.total(), "order placed");
        Ok(order)
    }

    pub async fn get(&self, id: &OrderId) -> Result<Order> {
        self.orders
            .get(id)
            .await
            .map_err(WalletError::StoreUnavailable)?
            .ok_or_else(|| WalletError::OrderNotFound(id.clone()))
    }

    /// Moves an unpaid order along its kitchen lifecycle (or cancels it).
    pub async fn advance(&self, id: &OrderId, to: OrderStatus) -> Result<Order> {
        let mut order = self.get(id).await?;
        let observed = order.state();
        let next = observed.advance(to)?;

        match self.orders.update_state(id, next, observed).await {
            Ok(()) => {
                order.apply_state(next);
                info!(order = %id, from = %observed.status, to = %next.status, "order status changed");
                Ok(order)
            }
            Err(StoreError::Conflict) => Err(WalletError::Busy(format!("order {id}"))),
            Err(StoreError::NotFound) => Err(WalletError::OrderNotFound(id.clone())),
            Err(e) => Err(WalletError::StoreUnavailable(e)),
        }
    }
}
