//! Environment configuration.
//!
//! Every required variable is checked up front so a missing one aborts the
//! run before any RPC traffic.

use std::{fmt, str::FromStr, time::Duration};

use alloy::{primitives::Address, signers::local::PrivateKeySigner};

use crate::{chain::Chain, error::ConfigError, retry::RetryConfig};

pub const SEPOLIA_RPC_URL: &str = "SEPOLIA_RPC_URL";
pub const BASE_SEPOLIA_RPC_URL: &str = "BASE_SEPOLIA_RPC_URL";
pub const PRIVATE_KEY: &str = "PRIVATE_KEY";
pub const SEPOLIA_LZ_ENDPOINT: &str = "SEPOLIA_LZ_ENDPOINT";
pub const BASE_SEPOLIA_LZ_ENDPOINT: &str = "BASE_SEPOLIA_LZ_ENDPOINT";

pub const REQUIRED: [&str; 5] = [
    SEPOLIA_RPC_URL,
    BASE_SEPOLIA_RPC_URL,
    PRIVATE_KEY,
    SEPOLIA_LZ_ENDPOINT,
    BASE_SEPOLIA_LZ_ENDPOINT,
];

#[derive(Clone)]
pub struct Config {
    pub sepolia: Chain,
    pub base_sepolia: Chain,
    pub signer: PrivateKeySigner,
    pub retry: RetryConfig,
    pub confirmation_timeout: Duration,
}

/// Custom Debug that keeps the signing key out of logs.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("sepolia", &self.sepolia)
            .field("base_sepolia", &self.base_sepolia)
            .field("signer", &self.signer.address())
            .field("private_key", &"<redacted>")
            .field("retry", &self.retry)
            .field("confirmation_timeout", &self.confirmation_timeout)
            .finish()
    }
}

impl Config {
    /// Load from the process environment. `.env` is read by the binary
    /// before this is called.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |name: &'static str| {
            lookup(name)
                .filter(|value| !value.trim().is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        // all presence checks first, so the first missing name is reported
        // regardless of later parse failures
        let sepolia_rpc = require(SEPOLIA_RPC_URL)?;
        let base_sepolia_rpc = require(BASE_SEPOLIA_RPC_URL)?;
        let private_key = require(PRIVATE_KEY)?;
        let sepolia_endpoint = require(SEPOLIA_LZ_ENDPOINT)?;
        let base_sepolia_endpoint = require(BASE_SEPOLIA_LZ_ENDPOINT)?;

        let signer = PrivateKeySigner::from_str(private_key.trim()).map_err(|e| {
            ConfigError::Invalid {
                name: PRIVATE_KEY,
                reason: e.to_string(),
            }
        })?;

        let defaults = RetryConfig::default();
        let retry = RetryConfig {
            max_retries: optional(&lookup, "RPC_MAX_RETRIES")?.unwrap_or(defaults.max_retries),
            initial_backoff: optional(&lookup, "RPC_INITIAL_BACKOFF_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.initial_backoff),
            call_timeout: optional(&lookup, "RPC_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.call_timeout),
            ..defaults
        };

        let confirmation_timeout = optional(&lookup, "CONFIRMATION_TIMEOUT_SECS")?
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(300));

        Ok(Self {
            sepolia: Chain::sepolia(
                sepolia_rpc,
                parse_address(SEPOLIA_LZ_ENDPOINT, &sepolia_endpoint)?,
            ),
            base_sepolia: Chain::base_sepolia(
                base_sepolia_rpc,
                parse_address(BASE_SEPOLIA_LZ_ENDPOINT, &base_sepolia_endpoint)?,
            ),
            signer,
            retry,
            confirmation_timeout,
        })
    }
}

fn parse_address(name: &'static str, value: &str) -> Result<Address, ConfigError> {
    Address::from_str(value.trim()).map_err(|e| ConfigError::Invalid {
        name,
        reason: e.to_string(),
    })
}

fn optional<F, T>(lookup: &F, name: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: fmt::Display,
{
    match lookup(name).filter(|value| !value.trim().is_empty()) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| ConfigError::Invalid {
                name,
                reason: e.to_string(),
            }),
    }
}
