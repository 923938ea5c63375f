use crate::domain::access::{AccessCode, Redemption};
use crate::domain::ids::AccountId;
use crate::domain::notice::{Notice, Recipient};
use crate::domain::now_millis;
use crate::domain::ports::{SharedAccessCodeStore, SharedAccountStore, SharedNotifier};
use crate::error::{Result, WalletError};
use std::time::Duration;
use tracing::{info, warn};

/// One-time codes that gate access to the wallet screens.
///
/// Codes live in an [`AccessCodeStore`](crate::domain::ports::AccessCodeStore) with an
/// expiry, one per account; issuing again replaces the previous code.
pub struct WalletAccess {
    accounts: SharedAccountStore,
    codes: SharedAccessCodeStore,
    notifier: SharedNotifier,
    ttl: Duration,
}

impl WalletAccess {
    pub fn new(
        accounts: SharedAccountStore,
        codes: SharedAccessCodeStore,
        notifier: SharedNotifier,
        ttl: Duration,
    ) -> Self {
        Self {
            accounts,
            codes,
            notifier,
            ttl,
        }
    }

    /// Generates a code and delivers it to the account holder.
    ///
    /// Delivery is awaited, unlike wallet notices.
    pub async fn issue(&self, account_id: &AccountId) -> Result<()> {
        let account = self
            .accounts
            .get(account_id)
            .await
            .map_err(WalletError::StoreUnavailable)?
            .ok_or_else(|| WalletError::AccountNotFound(account_id.clone()))?;

        let code = AccessCode::generate(self.ttl);
        let notice = Notice::AccessCode {
            to: Recipient::from(&account),
            code: code.code.clone(),
            ttl: self.ttl,
        };
        self.codes
            .put(account_id, code)
            .await
            .map_err(WalletError::StoreUnavailable)?;

        if let Err(e) = self.notifier.notify(&notice).await {
            warn!(account = %account_id, "access code delivery failed: {e}");
            return Err(e.into());
        }
        info!(account = %account_id, "access code issued");
        Ok(())
    }

    /// Checks an entered code; a correct code is consumed, so it verifies once.
    pub async fn verify(&self, account_id: &AccountId, entered: &str) -> Result<()> {
        let outcome = self
            .codes
            .redeem(account_id, entered, now_millis())
            .await
            .map_err(WalletError::StoreUnavailable)?;

        match outcome {
            Redemption::Accepted => {
                info!(account = %account_id, "access code verified");
                Ok(())
            }
            Redemption::Missing => Err(WalletError::AccessCodeMissing),
            Redemption::Expired => Err(WalletError::AccessCodeExpired),
            Redemption::Mismatch => Err(WalletError::AccessCodeInvalid),
        }
    }
}
