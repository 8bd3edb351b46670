use alloy::primitives::{Address, B256, U256};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    Missing(&'static str),
    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Failures of on-chain actions that callers need to tell apart from
/// transport errors.
#[derive(Debug, Error)]
pub enum FlowError {
    #[error("transaction {0} reverted")]
    Reverted(B256),
    #[error("data() of {contract} is not valid UTF-8")]
    Decode {
        contract: Address,
        #[source]
        source: std::string::FromUtf8Error,
    },
    #[error("fee moved beyond tolerance: re-quoted {fresh} wei, attaching {paid} wei")]
    FeeDrift { paid: U256, fresh: U256 },
    #[error("quoted fee {quoted} wei overflows a {margin_bps} bps margin")]
    FeeOverflow { quoted: U256, margin_bps: u32 },
    #[error("deployment {0} produced no contract address")]
    NoContractAddress(B256),
}
