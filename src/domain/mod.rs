//! Domain model: accounts, orders, money and the ports the application layer drives.

pub mod access;
pub mod account;
pub mod ids;
pub mod money;
pub mod notice;
pub mod order;
pub mod ports;

use std::time::{SystemTime, UNIX_EPOCH};

/// Milliseconds since the Unix epoch.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or_default()
}
