use crate::domain::ids::{AccountId, OrderId};
use crate::domain::money::Money;
use crate::domain::order::OrderStatus;
use miette::Diagnostic;
use thiserror::Error;

pub type Result<T, E = WalletError> = std::result::Result<T, E>;

/// Failures reported by storage backends.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,
    #[error("record already exists")]
    Duplicate,
    #[error("record was modified concurrently")]
    Conflict,
    #[error("storage backend unavailable: {0}")]
    Unavailable(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(Box::new(std::io::Error::other(message.into())))
    }
}

#[derive(Error, Debug)]
#[error("notification delivery failed: {0}")]
pub struct NotifyError(pub String);

/// Every outcome a wallet operation can fail with.
///
/// These are returned as values, never raised as panics. [`WalletError::reason`] gives
/// the stable tag shown to scanner clients.
#[derive(Error, Diagnostic, Debug)]
pub enum WalletError {
    #[error("order {0} not found")]
    #[diagnostic(code(foodcard::order_not_found))]
    OrderNotFound(OrderId),

    #[error("account {0} not found")]
    #[diagnostic(code(foodcard::account_not_found))]
    AccountNotFound(AccountId),

    #[error("order {0} has already been paid")]
    #[diagnostic(code(foodcard::already_settled))]
    AlreadySettled(OrderId),

    #[error("order {0} was cancelled")]
    #[diagnostic(code(foodcard::order_cancelled))]
    OrderCancelled(OrderId),

    #[error("insufficient balance: {required} required, {available} available")]
    #[diagnostic(code(foodcard::insufficient_funds))]
    InsufficientFunds { required: Money, available: Money },

    #[error("malformed payload: {0}")]
    #[diagnostic(code(foodcard::malformed_payload))]
    MalformedPayload(String),

    #[error("{0} is busy, retry later")]
    #[diagnostic(code(foodcard::busy), help("the operation had no effect and can be retried"))]
    Busy(String),

    #[error("store unavailable: {0}")]
    #[diagnostic(code(foodcard::store_unavailable))]
    StoreUnavailable(#[source] StoreError),

    #[error("settlement of order {0} is partially applied and needs reconciliation")]
    #[diagnostic(code(foodcard::reconciliation_required))]
    ReconciliationRequired(OrderId),

    #[error("cannot move order from {from} to {to}")]
    #[diagnostic(code(foodcard::invalid_transition))]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("validation error: {0}")]
    #[diagnostic(code(foodcard::validation))]
    Validation(String),

    #[error("no access code was issued")]
    #[diagnostic(code(foodcard::access_code_missing))]
    AccessCodeMissing,

    #[error("access code expired")]
    #[diagnostic(code(foodcard::access_code_expired))]
    AccessCodeExpired,

    #[error("access code does not match")]
    #[diagnostic(code(foodcard::access_code_invalid))]
    AccessCodeInvalid,

    #[error("{0}")]
    #[diagnostic(code(foodcard::notification_failed))]
    NotificationFailed(#[from] NotifyError),
}

impl WalletError {
    /// Stable machine-readable tag for the failure.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::OrderNotFound(_) => "OrderNotFound",
            Self::AccountNotFound(_) => "AccountNotFound",
            Self::AlreadySettled(_) => "AlreadySettled",
            Self::OrderCancelled(_) => "OrderCancelled",
            Self::InsufficientFunds { .. } => "InsufficientFunds",
            Self::MalformedPayload(_) => "MalformedPayload",
            Self::Busy(_) => "Busy",
            Self::StoreUnavailable(_) => "StoreUnavailable",
            Self::ReconciliationRequired(_) => "ReconciliationRequired",
            Self::InvalidTransition { .. } => "InvalidTransition",
            Self::Validation(_) => "Validation",
            Self::AccessCodeMissing => "AccessCodeMissing",
            Self::AccessCodeExpired => "AccessCodeExpired",
            Self::AccessCodeInvalid => "AccessCodeInvalid",
            Self::NotificationFailed(_) => "NotificationFailed",
        }
    }

    /// Whether repeating the same call may succeed without any other change.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Busy(_) | Self::StoreUnavailable(_))
    }
}
