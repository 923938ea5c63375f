use super::ids::AccountId;
use super::money::Money;
use crate::error::WalletError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Student,
    Staff,
    Admin,
}

/// A wallet-holding user.
///
/// The balance is never negative: [`Account::debit`] refuses to go below zero and
/// [`Account::credit`] refuses to overflow.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct Account {
    pub id: AccountId,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub balance: Money,
}

impl Account {
    pub fn new(id: AccountId, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            email: email.into(),
            role: Role::Student,
            balance: Money::ZERO,
        }
    }

    pub fn with_balance(mut self, balance: Money) -> Self {
        self.balance = balance;
        self
    }

    /// Adds funds to the balance.
    pub fn credit(&mut self, amount: Money) -> Result<(), WalletError> {
        self.balance = self.balance.checked_add(amount).ok_or_else(|| {
            WalletError::Validation(format!("crediting {amount} would overflow the wallet"))
        })?;
        Ok(())
    }

    /// Removes funds from the balance if sufficient.
    pub fn debit(&mut self, amount: Money) -> Result<(), WalletError> {
        match self.balance.checked_sub(amount) {
            Some(remaining) => {
                self.balance = remaining;
                Ok(())
            }
            None => Err(WalletError::InsufficientFunds {
                required: amount,
                available: self.balance,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(balance: u64) -> Account {
        Account::new(AccountId::parse("stu-1").unwrap(), "Asha", "asha@campus.edu")
            .with_balance(Money::from_minor(balance))
    }

    #[test]
    fn test_account_debit_success() {
        let mut account = account(10_000);
        account.debit(Money::from_minor(6_000)).unwrap();
        assert_eq!(account.balance, Money::from_minor(4_000));
    }

    #[test]
    fn test_account_debit_insufficient() {
        let mut account = account(1_000);
        let result = account.debit(Money::from_minor(2_000));
        assert!(matches!(
            result,
            Err(WalletError::InsufficientFunds { required, available })
                if required == Money::from_minor(2_000) && available == Money::from_minor(1_000)
        ));
        assert_eq!(account.balance, Money::from_minor(1_000));
    }

    #[test]
    fn test_account_debit_exact_balance() {
        let mut account = account(5_000);
        account.debit(Money::from_minor(5_000)).unwrap();
        assert_eq!(account.balance, Money::ZERO);
    }

    #[test]
    fn test_account_credit() {
        let mut account = account(0);
        account.credit(Money::from_minor(2_550)).unwrap();
        assert_eq!(account.balance, Money::from_minor(2_550));

        let mut full = account.clone().with_balance(Money::from_minor(u64::MAX));
        assert!(full.credit(Money::from_minor(1)).is_err());
    }

    #[test]
    fn test_role_defaults_to_student() {
        let json = r#"{"id":"stu-9","name":"Ravi","email":"ravi@campus.edu"}"#;
        let account: Account = serde_json::from_str(json).unwrap();
        assert_eq!(account.role, Role::Student);
        assert_eq!(account.balance, Money::ZERO);
    }
}
