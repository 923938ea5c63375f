use crate::application::Services;
use crate::application::orders::PlaceOrder;
use crate::application::settlement::{BalanceReceipt, SettlementReceipt};
use crate::domain::ids::{AccountId, OrderId};
use crate::domain::money::Amount;
use crate::domain::notice::WalletOperation;
use crate::domain::order::{MealType, Order, OrderStatus, PaymentStatus};
use crate::error::WalletError;
use crate::interfaces::scan::ScanIngest;
use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::{Method, StatusCode, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;

pub struct AppState {
    pub services: Services,
    pub scanner: ScanIngest,
}

impl AppState {
    pub fn new(services: Services) -> Arc<Self> {
        let scanner = ScanIngest::new(Arc::clone(&services.engine));
        Arc::new(Self { services, scanner })
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/api/scan", post(scan_payload_handler))
        .route("/api/scan/{order_id}", get(settle_handler).post(settle_handler))
        .route("/settle/{order_id}", get(settle_handler).post(settle_handler))
        .route("/api/wallet/{account_id}", get(balance_handler))
        .route("/api/wallet/add/{account_id}", post(top_up_handler))
        .route("/api/wallet/otp/{account_id}", post(issue_code_handler))
        .route("/api/wallet/verify/{account_id}", post(verify_code_handler))
        .route("/api/admin/wallet/{account_id}", post(adjust_handler))
        .route("/api/orders", post(place_order_handler))
        .route("/api/orders/{order_id}", get(get_order_handler))
        .route("/api/orders/{order_id}/status", patch(advance_order_handler))
        .layer(cors)
        .with_state(state)
}

impl IntoResponse for WalletError {
    fn into_response(self) -> Response {
        let status = match &self {
            WalletError::OrderNotFound(_) | WalletError::AccountNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            WalletError::AlreadySettled(_)
            | WalletError::OrderCancelled(_)
            | WalletError::InsufficientFunds { .. }
            | WalletError::MalformedPayload(_)
            | WalletError::InvalidTransition { .. }
            | WalletError::Validation(_)
            | WalletError::AccessCodeMissing
            | WalletError::AccessCodeExpired
            | WalletError::AccessCodeInvalid => StatusCode::BAD_REQUEST,
            WalletError::Busy(_) => StatusCode::CONFLICT,
            WalletError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            WalletError::ReconciliationRequired(_) | WalletError::NotificationFailed(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = ErrorBody {
            status: "error",
            reason: self.reason(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[derive(Serialize)]
struct ErrorBody {
    status: &'static str,
    reason: &'static str,
    message: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettleResponse {
    pub status: String,
    pub message: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub new_balance: Decimal,
    pub order_status: OrderStatus,
}

impl From<SettlementReceipt> for SettleResponse {
    fn from(receipt: SettlementReceipt) -> Self {
        Self {
            status: "ok".to_string(),
            message: format!("Payment of ₹{} deducted successfully", receipt.debited),
            new_balance: receipt.new_balance.to_decimal(),
            order_status: receipt.order_status,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceResponse {
    pub status: String,
    pub account_id: AccountId,
    #[serde(with = "rust_decimal::serde::float")]
    pub wallet_balance: Decimal,
}

impl From<BalanceReceipt> for BalanceResponse {
    fn from(receipt: BalanceReceipt) -> Self {
        Self {
            status: "ok".to_string(),
            account_id: receipt.account_id,
            wallet_balance: receipt.new_balance.to_decimal(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MessageResponse {
    status: &'static str,
    message: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OrderResponse {
    status: &'static str,
    order: OrderView,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OrderView {
    id: OrderId,
    account_id: AccountId,
    order_type: MealType,
    items: Vec<ItemView>,
    #[serde(with = "rust_decimal::serde::float")]
    total_amount: Decimal,
    order_status: OrderStatus,
    payment_status: PaymentStatus,
    paid_at_ms: Option<u64>,
}

#[derive(Debug, Serialize)]
struct ItemView {
    name: String,
    #[serde(with = "rust_decimal::serde::float")]
    price: Decimal,
    quantity: u32,
}

impl From<Order> for OrderView {
    fn from(order: Order) -> Self {
        Self {
            items: order
                .items()
                .iter()
                .map(|item| ItemView {
                    name: item.name.clone(),
                    price: item.unit_price.to_decimal(),
                    quantity: item.quantity,
                })
                .collect(),
            total_amount: order.total().to_decimal(),
            order_status: order.state().status,
            payment_status: order.state().payment,
            paid_at_ms: order.paid_at_ms(),
            id: order.id,
            account_id: order.account_id,
            order_type: order.meal_type,
        }
    }
}

fn order_response(order: Order) -> Json<OrderResponse> {
    Json(OrderResponse {
        status: "ok",
        order: order.into(),
    })
}

#[derive(Debug, Deserialize)]
pub struct TopUpRequest {
    pub amount: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct AdjustRequest {
    pub operation: WalletOperation,
    pub amount: Decimal,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    pub entered_otp: String,
}

#[derive(Debug, Deserialize)]
pub struct AdvanceRequest {
    pub status: OrderStatus,
}

fn order_id(raw: &str) -> Result<OrderId, WalletError> {
    OrderId::parse(raw).map_err(|e| WalletError::MalformedPayload(e.to_string()))
}

fn account_id(raw: &str) -> Result<AccountId, WalletError> {
    AccountId::parse(raw).map_err(|e| WalletError::Validation(e.to_string()))
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, WalletError> {
    payload
        .map(|Json(inner)| inner)
        .map_err(|rejection| WalletError::Validation(rejection.body_text()))
}

async fn settle_handler(
    State(state): State<Arc<AppState>>,
    Path(raw): Path<String>,
) -> Result<Json<SettleResponse>, WalletError> {
    let order_id = order_id(&raw)?;
    let receipt = state.services.engine.settle(&order_id).await?;
    Ok(Json(receipt.into()))
}

async fn scan_payload_handler(
    State(state): State<Arc<AppState>>,
    payload: String,
) -> Result<Json<SettleResponse>, WalletError> {
    let receipt = state.scanner.ingest(&payload).await?;
    Ok(Json(receipt.into()))
}

async fn balance_handler(
    State(state): State<Arc<AppState>>,
    Path(raw): Path<String>,
) -> Result<Json<BalanceResponse>, WalletError> {
    let account_id = account_id(&raw)?;
    let balance = state.services.engine.balance(&account_id).await?;
    Ok(Json(BalanceResponse {
        status: "ok".to_string(),
        account_id,
        wallet_balance: balance.to_decimal(),
    }))
}

async fn top_up_handler(
    State(state): State<Arc<AppState>>,
    Path(raw): Path<String>,
    payload: Result<Json<TopUpRequest>, JsonRejection>,
) -> Result<Json<BalanceResponse>, WalletError> {
    let account_id = account_id(&raw)?;
    let amount = Amount::try_from(body(payload)?.amount)?;
    let receipt = state.services.engine.top_up(&account_id, amount).await?;
    Ok(Json(receipt.into()))
}

async fn adjust_handler(
    State(state): State<Arc<AppState>>,
    Path(raw): Path<String>,
    payload: Result<Json<AdjustRequest>, JsonRejection>,
) -> Result<Json<BalanceResponse>, WalletError> {
    let account_id = account_id(&raw)?;
    let request = body(payload)?;
    let amount = Amount::try_from(request.amount)?;
    let receipt = state
        .services
        .engine
        .adjust(&account_id, request.operation, amount, request.reason)
        .await?;
    Ok(Json(receipt.into()))
}

async fn issue_code_handler(
    State(state): State<Arc<AppState>>,
    Path(raw): Path<String>,
) -> Result<impl IntoResponse, WalletError> {
    state.services.access.issue(&account_id(&raw)?).await?;
    Ok(Json(MessageResponse {
        status: "ok",
        message: "OTP sent successfully",
    }))
}

async fn verify_code_handler(
    State(state): State<Arc<AppState>>,
    Path(raw): Path<String>,
    payload: Result<Json<VerifyRequest>, JsonRejection>,
) -> Result<impl IntoResponse, WalletError> {
    let account_id = account_id(&raw)?;
    let request = body(payload)?;
    state
        .services
        .access
        .verify(&account_id, &request.entered_otp)
        .await?;
    Ok(Json(MessageResponse {
        status: "ok",
        message: "OTP verified successfully",
    }))
}

async fn place_order_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PlaceOrder>, JsonRejection>,
) -> Result<impl IntoResponse, WalletError> {
    let order = state.services.orders.place(body(payload)?).await?;
    Ok((StatusCode::CREATED, order_response(order)))
}

async fn get_order_handler(
    State(state): State<Arc<AppState>>,
    Path(raw): Path<String>,
) -> Result<impl IntoResponse, WalletError> {
    let order = state.services.orders.get(&order_id(&raw)?).await?;
    Ok(order_response(order))
}

async fn advance_order_handler(
    State(state): State<Arc<AppState>>,
    Path(raw): Path<String>,
    payload: Result<Json<AdvanceRequest>, JsonRejection>,
) -> Result<impl IntoResponse, WalletError> {
    let order_id = order_id(&raw)?;
    let request = body(payload)?;
    let order = state.services.orders.advance(&order_id, request.status).await?;
    Ok(order_response(order))
}
