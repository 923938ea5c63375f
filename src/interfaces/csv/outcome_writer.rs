use crate::application::settlement::SettlementReceipt;
use crate::error::WalletError;
use serde::Serialize;
use std::io::{self, Write};

#[derive(Debug, Serialize)]
struct OutcomeRow<'a> {
    order: &'a str,
    outcome: &'a str,
    new_balance: String,
}

/// Writes one CSV row per processed scan: `order,outcome,new_balance`.
///
/// `outcome` is `ok` or the failure reason tag; `new_balance` is empty on failure.
pub struct OutcomeWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> OutcomeWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write(
        &mut self,
        order: Option<&str>,
        outcome: &Result<SettlementReceipt, WalletError>,
    ) -> io::Result<()> {
        let row = match outcome {
            Ok(receipt) => OutcomeRow {
                order: receipt.order_id.as_str(),
                outcome: "ok",
                new_balance: receipt.new_balance.to_string(),
            },
            Err(e) => OutcomeRow {
                order: order.unwrap_or_default(),
                outcome: e.reason(),
                new_balance: String::new(),
            },
        };
        self.writer.serialize(row).map_err(io::Error::other)
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}
