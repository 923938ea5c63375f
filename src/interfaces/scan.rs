use crate::application::settlement::{SettlementEngine, SettlementReceipt};
use crate::domain::ids::OrderId;
use crate::error::{Result, WalletError};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// What a scanner station read off a QR code.
///
/// Only `order_id` drives settlement. `claimed_amount` and `student_name` are whatever
/// the code was printed with and are kept for display and logging.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanTicket {
    pub order_id: OrderId,
    pub claimed_amount: Option<Decimal>,
    pub student_name: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct QrPayload {
    order_id: Value,
    #[serde(default)]
    amount: Option<Value>,
    #[serde(default)]
    student_name: Option<Value>,
}

impl ScanTicket {
    /// Decodes a raw payload: either the JSON object printed on order QR codes
    /// (`{"orderId": ..., "amount": ..., "studentName": ...}`) or a bare order id.
    pub fn decode(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw.starts_with('{') {
            let payload: QrPayload = serde_json::from_str(raw)
                .map_err(|e| WalletError::MalformedPayload(format!("unreadable QR JSON: {e}")))?;
            let order_id = match &payload.order_id {
                Value::String(id) => parse_order_id(id)?,
                Value::Number(n) => parse_order_id(&n.to_string())?,
                other => {
                    return Err(WalletError::MalformedPayload(format!(
                        "orderId must be a string, got {other}"
                    )));
                }
            };
            Ok(Self {
                order_id,
                claimed_amount: payload.amount.as_ref().and_then(advisory_amount),
                student_name: payload
                    .student_name
                    .and_then(|name| name.as_str().map(str::to_string)),
            })
        } else {
            Ok(Self {
                order_id: parse_order_id(raw)?,
                claimed_amount: None,
                student_name: None,
            })
        }
    }
}

fn parse_order_id(raw: &str) -> Result<OrderId> {
    OrderId::parse(raw).map_err(|e| WalletError::MalformedPayload(e.to_string()))
}

// Advisory only, so anything unparsable is just dropped.
fn advisory_amount(value: &Value) -> Option<Decimal> {
    match value {
        Value::String(s) => s.trim().parse().ok(),
        Value::Number(n) => n.to_string().parse().ok(),
        _ => None,
    }
}

/// Turns scanner payloads into settlements.
#[derive(Clone)]
pub struct ScanIngest {
    engine: Arc<SettlementEngine>,
}

impl ScanIngest {
    pub fn new(engine: Arc<SettlementEngine>) -> Self {
        Self { engine }
    }

    /// Decodes `raw` and settles the referenced order, returning the engine's result
    /// unchanged. Malformed payloads never reach the engine.
    pub async fn ingest(&self, raw: &str) -> Result<SettlementReceipt> {
        let ticket = ScanTicket::decode(raw)?;
        self.settle_ticket(&ticket).await
    }

    pub async fn settle_ticket(&self, ticket: &ScanTicket) -> Result<SettlementReceipt> {
        debug!(order = %ticket.order_id, student = ?ticket.student_name, "scan decoded");

        let receipt = self.engine.settle(&ticket.order_id).await?;
        if let Some(claimed) = ticket.claimed_amount {
            if claimed != receipt.debited.to_decimal() {
                warn!(
                    order = %receipt.order_id,
                    %claimed,
                    charged = %receipt.debited,
                    "QR code amount differs from the stored order total; stored total was charged"
                );
            }
        }
        Ok(receipt)
    }
}
