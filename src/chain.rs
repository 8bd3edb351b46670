use alloy::{
    network::EthereumWallet,
    primitives::Address,
    providers::{Provider, ProviderBuilder},
    signers::local::PrivateKeySigner,
    transports::http::{Client, Http},
};
use eyre::{Result, WrapErr};
use tracing::info;

use crate::graph::{BASESEP_V2_TESTNET, SEPOLIA_V2_TESTNET};

/// One side of the read pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chain {
    pub name: &'static str,
    pub eid: u32,
    pub rpc_url: String,
    /// Protocol endpoint contract the app registers with
    pub lz_endpoint: Address,
    /// Constructor identifier of the app deployed here
    pub app_identifier: &'static str,
}

impl Chain {
    pub fn sepolia(rpc_url: String, lz_endpoint: Address) -> Self {
        Self {
            name: "sepolia",
            eid: SEPOLIA_V2_TESTNET,
            rpc_url,
            lz_endpoint,
            app_identifier: "oAppRead-A",
        }
    }

    pub fn base_sepolia(rpc_url: String, lz_endpoint: Address) -> Self {
        Self {
            name: "base-sepolia",
            eid: BASESEP_V2_TESTNET,
            rpc_url,
            lz_endpoint,
            app_identifier: "oAppRead-B",
        }
    }

    /// HTTP provider that fills nonce, gas and chain id and signs with
    /// `signer`. No request is made until the provider is used.
    pub fn connect(&self, signer: PrivateKeySigner) -> Result<impl Provider<Http<Client>> + Clone> {
        let url = self
            .rpc_url
            .parse()
            .wrap_err_with(|| format!("invalid RPC URL for {}", self.name))?;

        info!(chain = self.name, eid = self.eid, address = %signer.address(), "connecting");

        let wallet = EthereumWallet::from(signer);
        Ok(ProviderBuilder::new()
            .with_recommended_fillers()
            .wallet(wallet)
            .on_http(url))
    }
}
