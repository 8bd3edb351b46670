//! The read-and-verify round trip.
//!
//! The sender app asks the protocol to execute `verifyProof` on the target
//! app at the target chain's current block. Every step is awaited before
//! the next starts; only read-only calls are retried.

use alloy::primitives::{utils::format_ether, Address, Bytes, B256, U256};
use eyre::Result;
use tracing::{debug, info};

use crate::{
    app::ReadApp,
    calls::{ReadBundle, ReadTarget},
    config::Config,
    error::FlowError,
    fee::{FeePolicy, MessagingFee},
    options::Options,
    proof::Groth16Proof,
    retry::{with_retry, RetryConfig},
};

/// Read channel id the apps listen on.
pub const READ_CHANNEL_ID: u32 = 4_294_967_295;
pub const APP_LABEL: u16 = 1;
pub const COMPUTE_SETTING: u8 = 1;
pub const READ_CONFIRMATIONS: u16 = 1;
pub const EXECUTOR_GAS: u128 = 500_000;
pub const EXECUTOR_RESPONSE_SIZE: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadPlan {
    pub channel_id: u32,
    pub app_label: u16,
    pub compute_setting: u8,
    pub confirmations: u16,
    pub executor_gas: u128,
    pub executor_response_size: u32,
    pub executor_value: u128,
    pub fee: FeePolicy,
}

impl Default for ReadPlan {
    fn default() -> Self {
        Self {
            channel_id: READ_CHANNEL_ID,
            app_label: APP_LABEL,
            compute_setting: COMPUTE_SETTING,
            confirmations: READ_CONFIRMATIONS,
            executor_gas: EXECUTOR_GAS,
            executor_response_size: EXECUTOR_RESPONSE_SIZE,
            executor_value: 0,
            fee: FeePolicy::default(),
        }
    }
}

impl ReadPlan {
    pub fn options(&self) -> Options {
        Options::new().add_executor_lz_read_option(
            self.executor_gas,
            self.executor_response_size,
            self.executor_value,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadOutcome {
    pub tx_hash: B256,
    pub anchor_block: u64,
    pub quoted: MessagingFee,
    pub paid: U256,
    pub target_data: String,
    pub sender_data: String,
}

pub struct ReadFlow<'a> {
    sender: &'a dyn ReadApp,
    target: &'a dyn ReadApp,
    plan: ReadPlan,
    retry: RetryConfig,
}

impl<'a> ReadFlow<'a> {
    pub fn new(
        sender: &'a dyn ReadApp,
        target: &'a dyn ReadApp,
        plan: ReadPlan,
        retry: RetryConfig,
    ) -> Self {
        Self {
            sender,
            target,
            plan,
            retry,
        }
    }

    /// Runs the round trip for `proof`.
    ///
    /// The request is anchored at the target chain's latest block, the chain
    /// whose state is read, not at the sender chain's block.
    pub async fn run(&self, proof: &Groth16Proof) -> Result<ReadOutcome> {
        let call_data = proof.encode_verify_call();
        debug!(words = ?proof.hex_words(), "encoded verifyProof call");

        let anchor_block = with_retry(&self.retry, "block number", || {
            self.target.block_number()
        })
        .await?;

        let bundle = ReadBundle::single(
            self.plan.channel_id,
            self.plan.app_label,
            self.plan.compute_setting,
            self.plan.confirmations,
            ReadTarget {
                eid: self.target.eid(),
                app: self.target.address(),
                block: anchor_block,
            },
            call_data,
            self.plan.options().to_bytes(),
        );
        info!(
            target_eid = self.target.eid(),
            to = %self.target.address(),
            anchor_block,
            "estimating native fee"
        );

        let quoted = with_retry(&self.retry, "quote", || self.sender.quote(&bundle)).await?;
        let paid = self.plan.fee.apply(quoted.native_fee)?;
        info!(
            native_fee = %format_ether(quoted.native_fee),
            attached = %format_ether(paid),
            "estimated native fee"
        );

        if self.plan.fee.requote {
            let fresh = with_retry(&self.retry, "re-quote", || self.sender.quote(&bundle)).await?;
            debug!(fresh = %fresh.native_fee, "re-quoted before submit");
            self.plan.fee.check_drift(paid, fresh.native_fee)?;
        }

        info!("sending message");
        let tx_hash = self.sender.send(&bundle, paid).await?;
        info!(%tx_hash, "transaction confirmed");

        info!("verifying data states");
        let target_data = self.read_text(self.target).await?;
        info!(app = %self.target.address(), data = %target_data, "target data");
        let sender_data = self.read_text(self.sender).await?;
        info!(app = %self.sender.address(), data = %sender_data, "sender data");

        Ok(ReadOutcome {
            tx_hash,
            anchor_block,
            quoted,
            paid,
            target_data,
            sender_data,
        })
    }

    async fn read_text(&self, app: &dyn ReadApp) -> Result<String> {
        let raw = with_retry(&self.retry, "data", || app.data()).await?;
        Ok(decode_text(app.address(), raw)?)
    }
}

/// Loads configuration from `lookup`, builds the `(sender, target)` pair
/// with `connect` and runs the read flow, in that order. A missing or
/// invalid variable fails before `connect` is called.
pub async fn read_from_env<L, C, A>(lookup: L, plan: ReadPlan, connect: C) -> Result<ReadOutcome>
where
    L: Fn(&str) -> Option<String>,
    C: FnOnce(&Config) -> Result<(A, A)>,
    A: ReadApp,
{
    let config = Config::from_lookup(lookup)?;
    let proof = Groth16Proof::sample()?;
    let (sender, target) = connect(&config)?;
    info!(sender = %sender.address(), target = %target.address(), "starting read");

    ReadFlow::new(&sender, &target, plan, config.retry.clone())
        .run(&proof)
        .await
}

pub fn decode_text(contract: Address, raw: Bytes) -> Result<String, FlowError> {
    String::from_utf8(raw.to_vec()).map_err(|source| FlowError::Decode { contract, source })
}
