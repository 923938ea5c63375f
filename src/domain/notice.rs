use super::account::Account;
use super::ids::AccountId;
use super::money::Money;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
pub enum WalletOperation {
    #[serde(rename = "add")]
    Credit,
    #[serde(rename = "deduct")]
    Debit,
}

impl WalletOperation {
    fn past_tense(self) -> &'static str {
        match self {
            Self::Credit => "credited",
            Self::Debit => "debited",
        }
    }
}

/// Who a notice goes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipient {
    pub account_id: AccountId,
    pub name: String,
    pub email: String,
}

impl From<&Account> for Recipient {
    fn from(account: &Account) -> Self {
        Self {
            account_id: account.id.clone(),
            name: account.name.clone(),
            email: account.email.clone(),
        }
    }
}

/// Messages sent to account holders after something happened to their wallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Wallet {
        to: Recipient,
        operation: WalletOperation,
        amount: Money,
        new_balance: Money,
        reason: Option<String>,
    },
    AccessCode {
        to: Recipient,
        code: String,
        ttl: Duration,
    },
}

impl Notice {
    pub fn recipient(&self) -> &Recipient {
        match self {
            Self::Wallet { to, .. } | Self::AccessCode { to, .. } => to,
        }
    }

    pub fn subject(&self) -> String {
        match self {
            Self::Wallet { operation, .. } => {
                format!("Your wallet has been {}", operation.past_tense())
            }
            Self::AccessCode { .. } => "Your Wallet Access OTP".to_string(),
        }
    }

    pub fn body(&self) -> String {
        match self {
            Self::Wallet {
                to,
                operation,
                amount,
                new_balance,
                reason,
            } => {
                let mut text = format!(
                    "Hi {},\nYour wallet has been {} by ₹{amount}.\nNew balance: ₹{new_balance}",
                    display_name(&to.name),
                    operation.past_tense(),
                );
                if let Some(reason) = reason {
                    text.push_str(&format!("\nReason: {reason}"));
                }
                text.push_str("\n\nRegards,\nFoodCard");
                text
            }
            Self::AccessCode { code, ttl, .. } => {
                let minutes = ttl.as_secs().div_ceil(60).max(1);
                format!("Your 6-digit OTP is {code}. It will expire in {minutes} minute(s).")
            }
        }
    }
}

fn display_name(name: &str) -> &str {
    if name.trim().is_empty() { "User" } else { name }
}
