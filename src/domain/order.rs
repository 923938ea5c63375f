use super::ids::{AccountId, OrderId};
use super::money::Money;
use crate::domain::now_millis;
use crate::error::WalletError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Preparing,
    Ready,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Preparing => "preparing",
            Self::Ready => "ready",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
}

/// The mutable part of an order: lifecycle status plus payment flag.
///
/// Stores compare-and-swap on this pair, so it is the unit of optimistic concurrency
/// for orders.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
pub struct OrderState {
    pub status: OrderStatus,
    pub payment: PaymentStatus,
}

impl OrderState {
    pub const OPEN: Self = Self {
        status: OrderStatus::Pending,
        payment: PaymentStatus::Pending,
    };

    pub const SETTLED: Self = Self {
        status: OrderStatus::Completed,
        payment: PaymentStatus::Paid,
    };

    pub fn is_settled(self) -> bool {
        self.payment == PaymentStatus::Paid || self.status == OrderStatus::Completed
    }

    /// Staff-driven progression. `Completed` is only reachable through settlement.
    pub fn advance(self, to: OrderStatus) -> Result<Self, WalletError> {
        let allowed = !self.status.is_terminal()
            && self.payment == PaymentStatus::Pending
            && to != OrderStatus::Completed
            && to != self.status;
        if allowed {
            Ok(Self {
                status: to,
                payment: self.payment,
            })
        } else {
            Err(WalletError::InvalidTransition {
                from: self.status,
                to,
            })
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct LineItem {
    pub name: String,
    pub unit_price: Money,
    pub quantity: u32,
}

impl LineItem {
    pub fn new(name: impl Into<String>, unit_price: Decimal, quantity: u32) -> Result<Self, WalletError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(WalletError::Validation("item name must not be empty".to_string()));
        }
        if quantity == 0 {
            return Err(WalletError::Validation(format!(
                "quantity of {name} must be at least 1"
            )));
        }
        Ok(Self {
            name,
            unit_price: Money::from_decimal(unit_price)?,
            quantity,
        })
    }

    pub fn subtotal(&self) -> Option<Money> {
        self.unit_price.checked_mul(self.quantity)
    }
}

/// A placed food order.
///
/// `items` and `total` are fixed at placement; only [`OrderState`] and the payment
/// timestamp change afterwards.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct Order {
    pub id: OrderId,
    pub account_id: AccountId,
    pub meal_type: MealType,
    items: Vec<LineItem>,
    total: Money,
    #[serde(flatten)]
    state: OrderState,
    placed_at_ms: u64,
    paid_at_ms: Option<u64>,
}

impl Order {
    pub fn place(
        id: OrderId,
        account_id: AccountId,
        meal_type: MealType,
        items: Vec<LineItem>,
    ) -> Result<Self, WalletError> {
        if items.is_empty() {
            return Err(WalletError::Validation(
                "an order needs at least one item".to_string(),
            ));
        }
        let total = items
            .iter()
            .try_fold(Money::ZERO, |sum, item| {
                item.subtotal().and_then(|subtotal| sum.checked_add(subtotal))
            })
            .ok_or_else(|| WalletError::Validation("order total is out of range".to_string()))?;

        Ok(Self {
            id,
            account_id,
            meal_type,
            items,
            total,
            state: OrderState::OPEN,
            placed_at_ms: now_millis(),
            paid_at_ms: None,
        })
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn total(&self) -> Money {
        self.total
    }

    pub fn state(&self) -> OrderState {
        self.state
    }

    pub fn placed_at_ms(&self) -> u64 {
        self.placed_at_ms
    }

    pub fn paid_at_ms(&self) -> Option<u64> {
        self.paid_at_ms
    }

    /// Writes a new state, stamping the payment time on the move to paid.
    ///
    /// Callers (the stores) are responsible for having checked the expected state.
    pub fn apply_state(&mut self, state: OrderState) {
        if state.payment == PaymentStatus::Paid && self.state.payment != PaymentStatus::Paid {
            self.paid_at_ms = Some(now_millis());
        }
        self.state = state;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn order(items: Vec<LineItem>) -> Result<Order, WalletError> {
        Order::place(
            OrderId::parse("ord-1").unwrap(),
            AccountId::parse("stu-1").unwrap(),
            MealType::Lunch,
            items,
        )
    }

    #[test]
    fn test_total_is_sum_of_price_times_quantity() {
        let order = order(vec![
            LineItem::new("Thali", dec!(45.50), 1).unwrap(),
            LineItem::new("Chai", dec!(7.25), 2).unwrap(),
        ])
        .unwrap();
        assert_eq!(order.total(), Money::from_minor(6_000));
        assert_eq!(order.state(), OrderState::OPEN);
        assert_eq!(order.paid_at_ms(), None);
    }

    #[test]
    fn test_line_item_validation() {
        assert!(matches!(
            LineItem::new("Dosa", dec!(30), 0),
            Err(WalletError::Validation(_))
        ));
        assert!(matches!(
            LineItem::new("Dosa", dec!(-30), 1),
            Err(WalletError::Validation(_))
        ));
        assert!(matches!(
            LineItem::new("  ", dec!(30), 1),
            Err(WalletError::Validation(_))
        ));
        assert!(LineItem::new("Water", dec!(0), 1).is_ok());
    }

    #[test]
    fn test_empty_order_rejected() {
        assert!(matches!(order(vec![]), Err(WalletError::Validation(_))));
    }

    #[test]
    fn test_apply_state_stamps_payment_time() {
        let mut order = order(vec![LineItem::new("Idli", dec!(20), 1).unwrap()]).unwrap();
        order.apply_state(OrderState::SETTLED);
        assert!(order.state().is_settled());
        assert!(order.paid_at_ms().is_some());
    }

    #[test]
    fn test_advance_rules() {
        let open = OrderState::OPEN;
        let confirmed = open.advance(OrderStatus::Confirmed).unwrap();
        assert_eq!(confirmed.status, OrderStatus::Confirmed);
        assert!(confirmed.advance(OrderStatus::Cancelled).is_ok());

        assert!(matches!(
            open.advance(OrderStatus::Completed),
            Err(WalletError::InvalidTransition { .. })
        ));
        assert!(OrderState::SETTLED.advance(OrderStatus::Ready).is_err());

        let cancelled = open.advance(OrderStatus::Cancelled).unwrap();
        assert!(cancelled.advance(OrderStatus::Pending).is_err());
    }

    #[test]
    fn test_state_serializes_flat() {
        let order = order(vec![LineItem::new("Poha", dec!(25), 1).unwrap()]).unwrap();
        let value = serde_json::to_value(&order).unwrap();
        assert_eq!(value["status"], "pending");
        assert_eq!(value["payment"], "pending");
        assert_eq!(value["total"], 2_500);
    }
}
