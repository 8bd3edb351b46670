#![allow(dead_code)]

use std::{
    collections::{HashMap, VecDeque},
    sync::Mutex,
};

use alloy::primitives::{Address, Bytes, B256, U256};
use async_trait::async_trait;
use eyre::{eyre, Result};

use oapp_read::{
    calls::ReadBundle,
    deploy::{Artifact, Deployer},
    fee::MessagingFee,
    wire::peer_word,
    FlowError, ReadApp,
};

pub const SENT_TX: B256 = B256::repeat_byte(0x11);
pub const REVERTED_TX: B256 = B256::repeat_byte(0xee);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    BlockNumber,
    Peer(u32),
    SetPeer(u32, B256),
    SetReadChannel(u32, bool),
    Quote,
    Send(U256),
    Data,
}

/// In-memory stand-in for a deployed read app that records every call.
pub struct MockApp {
    pub eid: u32,
    pub address: Address,
    pub block: u64,
    quotes: Mutex<VecDeque<U256>>,
    send_reverts: bool,
    data: Bytes,
    peers: Mutex<HashMap<u32, B256>>,
    calls: Mutex<Vec<Call>>,
    bundles: Mutex<Vec<ReadBundle>>,
}

impl MockApp {
    pub fn new(eid: u32, address: Address, block: u64) -> Self {
        Self {
            eid,
            address,
            block,
            quotes: Mutex::new(VecDeque::new()),
            send_reverts: false,
            data: Bytes::new(),
            peers: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            bundles: Mutex::new(Vec::new()),
        }
    }

    /// Successive quotes; the last one repeats.
    pub fn with_quotes(self, fees: impl IntoIterator<Item = U256>) -> Self {
        *self.quotes.lock().unwrap() = fees.into_iter().collect();
        self
    }

    pub fn with_data(mut self, data: &'static [u8]) -> Self {
        self.data = Bytes::from_static(data);
        self
    }

    pub fn reverting_send(mut self) -> Self {
        self.send_reverts = true;
        self
    }

    pub fn with_peer(self, eid: u32, peer: B256) -> Self {
        self.peers.lock().unwrap().insert(eid, peer);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, matches: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| matches(c)).count()
    }

    pub fn sent_bundles(&self) -> Vec<ReadBundle> {
        self.bundles.lock().unwrap().clone()
    }

    pub fn stored_peer(&self, eid: u32) -> Option<B256> {
        self.peers.lock().unwrap().get(&eid).copied()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ReadApp for MockApp {
    fn eid(&self) -> u32 {
        self.eid
    }

    fn address(&self) -> Address {
        self.address
    }

    async fn block_number(&self) -> Result<u64> {
        self.record(Call::BlockNumber);
        Ok(self.block)
    }

    async fn peer(&self, eid: u32) -> Result<B256> {
        self.record(Call::Peer(eid));
        Ok(self.stored_peer(eid).unwrap_or_default())
    }

    async fn set_peer(&self, eid: u32, peer: B256) -> Result<B256> {
        self.record(Call::SetPeer(eid, peer));
        self.peers.lock().unwrap().insert(eid, peer);
        Ok(SENT_TX)
    }

    async fn set_read_channel(&self, channel_id: u32, active: bool) -> Result<B256> {
        self.record(Call::SetReadChannel(channel_id, active));
        let peer = if active {
            peer_word(self.address)
        } else {
            B256::ZERO
        };
        self.peers.lock().unwrap().insert(channel_id, peer);
        Ok(SENT_TX)
    }

    async fn quote(&self, bundle: &ReadBundle) -> Result<MessagingFee> {
        self.record(Call::Quote);
        self.bundles.lock().unwrap().push(bundle.clone());

        let mut quotes = self.quotes.lock().unwrap();
        let next = if quotes.len() > 1 {
            quotes.pop_front()
        } else {
            quotes.front().copied()
        };
        let native_fee = next.ok_or_else(|| eyre!("execution reverted: no quote configured"))?;

        Ok(MessagingFee {
            native_fee,
            lz_token_fee: U256::ZERO,
        })
    }

    async fn send(&self, bundle: &ReadBundle, value: U256) -> Result<B256> {
        self.record(Call::Send(value));
        self.bundles.lock().unwrap().push(bundle.clone());
        if self.send_reverts {
            return Err(FlowError::Reverted(REVERTED_TX).into());
        }
        Ok(SENT_TX)
    }

    async fn data(&self) -> Result<Bytes> {
        self.record(Call::Data);
        Ok(self.data.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployCall {
    Deploy { contract: String, args: Vec<u8> },
    SetVerifier { app: Address, verifier: Address },
}

/// Hands out sequential addresses and records every deployment step.
#[derive(Default)]
pub struct MockDeployer {
    reverts: Option<String>,
    set_verifier_reverts: bool,
    calls: Mutex<Vec<DeployCall>>,
}

impl MockDeployer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deploying the contract called `name` reverts.
    pub fn reverting(mut self, name: &str) -> Self {
        self.reverts = Some(name.to_string());
        self
    }

    pub fn reverting_set_verifier(mut self) -> Self {
        self.set_verifier_reverts = true;
        self
    }

    pub fn calls(&self) -> Vec<DeployCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Address assigned to the `n`th deployment, counting from one.
    pub fn address_of(n: u8) -> Address {
        Address::repeat_byte(n)
    }
}

#[async_trait]
impl Deployer for MockDeployer {
    async fn deploy(&self, artifact: &Artifact, constructor_args: &[u8]) -> Result<Address> {
        let mut calls = self.calls.lock().unwrap();
        calls.push(DeployCall::Deploy {
            contract: artifact.name.clone(),
            args: constructor_args.to_vec(),
        });
        if self.reverts.as_deref() == Some(artifact.name.as_str()) {
            return Err(FlowError::Reverted(REVERTED_TX).into());
        }
        let deployed = calls
            .iter()
            .filter(|c| matches!(c, DeployCall::Deploy { .. }))
            .count();
        Ok(Self::address_of(deployed as u8))
    }

    async fn set_verifier(&self, app: Address, verifier: Address) -> Result<B256> {
        self.calls
            .lock()
            .unwrap()
            .push(DeployCall::SetVerifier { app, verifier });
        if self.set_verifier_reverts {
            return Err(FlowError::Reverted(REVERTED_TX).into());
        }
        Ok(SENT_TX)
    }
}
