use miette::Diagnostic;
use std::{env, fmt::Display, str::FromStr, time::Duration};
use thiserror::Error;
use tracing::info;

pub const DEFAULT_BIND: &str = "0.0.0.0:5000";
pub const DEFAULT_LOCK_TIMEOUT_MS: u64 = 2_000;
pub const DEFAULT_OTP_TTL_SECS: u64 = 120;

#[derive(Error, Diagnostic, Debug)]
#[error("invalid value {value:?} for {key}: {message}")]
#[diagnostic(code(foodcard::config))]
pub struct ConfigError {
    pub key: String,
    pub value: String,
    pub message: String,
}

/// Runtime settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Address the HTTP API listens on.
    pub bind: String,
    /// Longest an operation waits for its account's critical section.
    pub lock_timeout: Duration,
    /// Lifetime of a wallet access code.
    pub otp_ttl: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            lock_timeout: Duration::from_millis(DEFAULT_LOCK_TIMEOUT_MS),
            otp_ttl: Duration::from_secs(DEFAULT_OTP_TTL_SECS),
        }
    }
}

impl Config {
    /// Reads `FOODCARD_BIND`, `FOODCARD_LOCK_TIMEOUT_MS` and `FOODCARD_OTP_TTL_SECS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            bind: try_load(&lookup, "FOODCARD_BIND", DEFAULT_BIND.to_string())?,
            lock_timeout: Duration::from_millis(try_load(
                &lookup,
                "FOODCARD_LOCK_TIMEOUT_MS",
                DEFAULT_LOCK_TIMEOUT_MS,
            )?),
            otp_ttl: Duration::from_secs(try_load(
                &lookup,
                "FOODCARD_OTP_TTL_SECS",
                DEFAULT_OTP_TTL_SECS,
            )?),
        })
    }
}

fn try_load<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr + Display,
    T::Err: Display,
{
    match lookup(key) {
        None => {
            info!("{key} not set, using default: {default}");
            Ok(default)
        }
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError {
            key: key.to_string(),
            value: raw.clone(),
            message: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("FOODCARD_BIND", "127.0.0.1:8080"),
            ("FOODCARD_LOCK_TIMEOUT_MS", "250"),
            ("FOODCARD_OTP_TTL_SECS", "30"),
        ]))
        .unwrap();
        assert_eq!(config.bind, "127.0.0.1:8080");
        assert_eq!(config.lock_timeout, Duration::from_millis(250));
        assert_eq!(config.otp_ttl, Duration::from_secs(30));
    }

    #[test]
    fn test_invalid_value_is_an_error() {
        let err = Config::from_lookup(lookup(&[("FOODCARD_LOCK_TIMEOUT_MS", "soon")])).unwrap_err();
        assert_eq!(err.key, "FOODCARD_LOCK_TIMEOUT_MS");
        assert_eq!(err.value, "soon");
    }
}
