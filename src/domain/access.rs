use super::now_millis;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// What presenting a code did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Redemption {
    Missing,
    Expired,
    Mismatch,
    Accepted,
}

impl Redemption {
    /// Whether the stored code is gone afterwards.
    pub fn consumes(self) -> bool {
        matches!(self, Self::Expired | Self::Accepted)
    }
}

/// A one-time code gating wallet access, valid until `expires_at_ms`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessCode {
    pub code: String,
    pub expires_at_ms: u64,
}

impl AccessCode {
    /// Draws a fresh 6-digit code that lives for `ttl`.
    pub fn generate(ttl: Duration) -> Self {
        let code = rand::thread_rng().gen_range(100_000..1_000_000).to_string();
        let ttl_ms = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX);
        Self {
            code,
            expires_at_ms: now_millis().saturating_add(ttl_ms),
        }
    }

    pub fn is_expired_at(&self, now_ms: u64) -> bool {
        now_ms >= self.expires_at_ms
    }

    /// Checks `entered` against this code at `now_ms`. Expiry wins over a match.
    pub fn redeem(&self, entered: &str, now_ms: u64) -> Redemption {
        if self.is_expired_at(now_ms) {
            Redemption::Expired
        } else if self.matches(entered) {
            Redemption::Accepted
        } else {
            Redemption::Mismatch
        }
    }

    pub fn matches(&self, entered: &str) -> bool {
        let entered = entered.trim().as_bytes();
        let expected = self.code.as_bytes();
        entered.len() == expected.len()
            && entered
                .iter()
                .zip(expected)
                .fold(0u8, |acc, (a, b)| acc | (a ^ b))
                == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_code_shape() {
        let code = AccessCode::generate(Duration::from_secs(120));
        assert_eq!(code.code.len(), 6);
        assert!(code.code.bytes().all(|b| b.is_ascii_digit()));
        assert!(!code.is_expired_at(now_millis()));
    }

    #[test]
    fn test_expiry_boundary() {
        let code = AccessCode {
            code: "123456".to_string(),
            expires_at_ms: 1_000,
        };
        assert!(!code.is_expired_at(999));
        assert!(code.is_expired_at(1_000));
    }

    #[test]
    fn test_matches() {
        let code = AccessCode {
            code: "482913".to_string(),
            expires_at_ms: u64::MAX,
        };
        assert!(code.matches("482913"));
        assert!(code.matches(" 482913\n"));
        assert!(!code.matches("482914"));
        assert!(!code.matches("48291"));
    }

    #[test]
    fn test_redeem_outcomes() {
        let code = AccessCode {
            code: "482913".to_string(),
            expires_at_ms: 1_000,
        };
        assert_eq!(code.redeem("482913", 999), Redemption::Accepted);
        assert_eq!(code.redeem("000000", 999), Redemption::Mismatch);
        assert_eq!(code.redeem("482913", 1_000), Redemption::Expired);
        assert!(!Redemption::Mismatch.consumes());
        assert!(!Redemption::Missing.consumes());
    }
}
