//! Handle to a deployed read app.
//!
//! [`ReadApp`] is the seam between the orchestration flows and the chain:
//! the flows only see this trait, [`OAppRead`] backs it with an alloy
//! contract instance.

use std::time::Duration;

use alloy::{
    network::Ethereum,
    primitives::{Address, Bytes, B256, U256},
    providers::{PendingTransactionBuilder, Provider},
    rpc::types::TransactionReceipt,
    transports::Transport,
};
use async_trait::async_trait;
use eyre::Result;
use tracing::{debug, info};

use crate::{
    bindings::MyOAppRead::{self, MyOAppReadInstance},
    calls::ReadBundle,
    error::FlowError,
    fee::MessagingFee,
};

#[async_trait]
pub trait ReadApp: Send + Sync {
    /// Endpoint id of the chain the app is deployed on
    fn eid(&self) -> u32;

    fn address(&self) -> Address;

    /// Latest block of the chain the app is deployed on.
    async fn block_number(&self) -> Result<u64>;

    async fn peer(&self, eid: u32) -> Result<B256>;

    async fn set_peer(&self, eid: u32, peer: B256) -> Result<B256>;

    async fn set_read_channel(&self, channel_id: u32, active: bool) -> Result<B256>;

    /// `quote(..., payInLzToken = false)`
    async fn quote(&self, bundle: &ReadBundle) -> Result<MessagingFee>;

    /// Submits `send` with `value` attached and waits for it to be mined.
    async fn send(&self, bundle: &ReadBundle, value: U256) -> Result<B256>;

    async fn data(&self) -> Result<Bytes>;
}

pub struct OAppRead<P, T> {
    eid: u32,
    contract: MyOAppReadInstance<T, P>,
    confirmation_timeout: Duration,
}

impl<P, T> OAppRead<P, T>
where
    P: Provider<T, Ethereum>,
    T: Transport + Clone,
{
    pub fn new(eid: u32, address: Address, provider: P, confirmation_timeout: Duration) -> Self {
        Self {
            eid,
            contract: MyOAppRead::new(address, provider),
            confirmation_timeout,
        }
    }

    async fn confirm(&self, pending: PendingTransactionBuilder<T, Ethereum>) -> Result<B256> {
        Ok(confirm(pending, self.confirmation_timeout)
            .await?
            .transaction_hash)
    }
}

/// Waits for `pending` to be mined, at most `timeout`, and fails with
/// [`FlowError::Reverted`] when the receipt reports a revert.
pub async fn confirm<T>(
    pending: PendingTransactionBuilder<T, Ethereum>,
    timeout: Duration,
) -> Result<TransactionReceipt>
where
    T: Transport + Clone,
{
    let tx_hash = *pending.tx_hash();
    debug!(%tx_hash, ?timeout, "awaiting confirmation");

    let receipt = pending.with_timeout(Some(timeout)).get_receipt().await?;
    ensure_success(receipt.transaction_hash, receipt.status())?;
    Ok(receipt)
}

pub fn ensure_success(tx_hash: B256, status: bool) -> Result<(), FlowError> {
    if !status {
        return Err(FlowError::Reverted(tx_hash));
    }
    Ok(())
}

#[async_trait]
impl<P, T> ReadApp for OAppRead<P, T>
where
    P: Provider<T, Ethereum>,
    T: Transport + Clone,
{
    fn eid(&self) -> u32 {
        self.eid
    }

    fn address(&self) -> Address {
        *self.contract.address()
    }

    async fn block_number(&self) -> Result<u64> {
        Ok(self.contract.provider().get_block_number().await?)
    }

    async fn peer(&self, eid: u32) -> Result<B256> {
        Ok(self.contract.peers(eid).call().await?.peer)
    }

    async fn set_peer(&self, eid: u32, peer: B256) -> Result<B256> {
        let pending = self.contract.setPeer(eid, peer).send().await?;
        self.confirm(pending).await
    }

    async fn set_read_channel(&self, channel_id: u32, active: bool) -> Result<B256> {
        let pending = self
            .contract
            .setReadChannel(channel_id, active)
            .send()
            .await?;
        self.confirm(pending).await
    }

    async fn quote(&self, bundle: &ReadBundle) -> Result<MessagingFee> {
        let fee = self
            .contract
            .quote(
                bundle.channel_id,
                bundle.app_label,
                bundle.call_requests(),
                (&bundle.compute).into(),
                bundle.options.clone(),
                false,
            )
            .call()
            .await?
            .fee;
        Ok(fee.into())
    }

    async fn send(&self, bundle: &ReadBundle, value: U256) -> Result<B256> {
        let pending = self
            .contract
            .send(
                bundle.channel_id,
                bundle.app_label,
                bundle.call_requests(),
                (&bundle.compute).into(),
                bundle.options.clone(),
            )
            .value(value)
            .send()
            .await?;
        info!(tx_hash = %pending.tx_hash(), "message sent");
        self.confirm(pending).await
    }

    async fn data(&self) -> Result<Bytes> {
        Ok(self.contract.data().call().await?._0)
    }
}
