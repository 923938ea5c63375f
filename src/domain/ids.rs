use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

const MAX_ID_LEN: usize = 64;
const GENERATED_ID_LEN: usize = 24;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid identifier {0:?}")]
pub struct InvalidId(pub String);

fn validate(raw: &str) -> Result<&str, InvalidId> {
    let trimmed = raw.trim();
    let well_formed = !trimmed.is_empty()
        && trimmed.len() <= MAX_ID_LEN
        && trimmed
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
    if well_formed {
        Ok(trimmed)
    } else {
        Err(InvalidId(raw.to_string()))
    }
}

fn generate_hex() -> String {
    let mut rng = rand::thread_rng();
    (0..GENERATED_ID_LEN)
        .map(|_| char::from_digit(rng.gen_range(0..16), 16).unwrap_or('0'))
        .collect()
}

macro_rules! opaque_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Parses an externally supplied identifier.
            pub fn parse(raw: &str) -> Result<Self, InvalidId> {
                validate(raw).map(|id| Self(id.to_string()))
            }

            /// Creates a fresh random identifier.
            pub fn generate() -> Self {
                Self(generate_hex())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl TryFrom<String> for $name {
            type Error = InvalidId;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::parse(&value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

opaque_id!(
    /// Identifier of a wallet-holding account.
    AccountId
);

opaque_id!(
    /// Identifier of a food order.
    OrderId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_object_id_shape() {
        let id = OrderId::parse("6523f1c2ab34cd56ef789012").unwrap();
        assert_eq!(id.as_str(), "6523f1c2ab34cd56ef789012");
        assert_eq!(AccountId::parse(" stu-1 ").unwrap().as_str(), "stu-1");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(OrderId::parse("").is_err());
        assert!(OrderId::parse("../etc/passwd").is_err());
        assert!(OrderId::parse("{\"orderId\":1}").is_err());
        assert!(OrderId::parse(&"a".repeat(65)).is_err());
    }

    #[test]
    fn test_generate_is_parseable() {
        let id = OrderId::generate();
        assert_eq!(id.as_str().len(), GENERATED_ID_LEN);
        assert_eq!(OrderId::parse(id.as_str()).unwrap(), id);
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: AccountId = serde_json::from_str("\"stu_42\"").unwrap();
        assert_eq!(ok.as_str(), "stu_42");
        assert!(serde_json::from_str::<AccountId>("\"bad id\"").is_err());
    }
}
