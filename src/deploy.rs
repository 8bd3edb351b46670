//! Contract deployment.
//!
//! Bytecode comes from compiled artifacts on disk (Hardhat or Foundry
//! layout). Each step waits for its receipt; a failure part-way leaves the
//! already mined contracts in place.

use std::{marker::PhantomData, path::Path, time::Duration};

use alloy::{
    network::{Ethereum, TransactionBuilder},
    primitives::{Address, Bytes, B256},
    providers::Provider,
    rpc::types::TransactionRequest,
    sol_types::SolValue,
    transports::Transport,
};
use async_trait::async_trait;
use eyre::{eyre, Result, WrapErr};
use serde::Deserialize;
use tracing::info;

use crate::{app::confirm, bindings::MyOAppRead, chain::Chain, error::FlowError};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum BytecodeField {
    /// Hardhat: `"bytecode": "0x..."`
    Hex(Bytes),
    /// Foundry: `"bytecode": { "object": "0x...", ... }`
    Object { object: Bytes },
}

#[derive(Debug, Deserialize)]
struct ArtifactFile {
    #[serde(rename = "contractName", default)]
    contract_name: Option<String>,
    bytecode: BytecodeField,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub name: String,
    pub bytecode: Bytes,
}

impl Artifact {
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read artifact {}", path.display()))?;
        let fallback = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::from_json(&content, &fallback)
            .wrap_err_with(|| format!("invalid artifact {}", path.display()))
    }

    pub fn from_json(content: &str, fallback_name: &str) -> Result<Self> {
        let file: ArtifactFile = serde_json::from_str(content)?;
        let bytecode = match file.bytecode {
            BytecodeField::Hex(code) => code,
            BytecodeField::Object { object } => object,
        };
        let name = file
            .contract_name
            .unwrap_or_else(|| fallback_name.to_string());

        if bytecode.is_empty() {
            return Err(eyre!("{name} has no creation bytecode (abstract or interface?)"));
        }

        Ok(Self { name, bytecode })
    }

    /// Creation code followed by ABI-encoded constructor arguments.
    pub fn deployment_code(&self, constructor_args: &[u8]) -> Bytes {
        [&self.bytecode[..], constructor_args].concat().into()
    }
}

#[derive(Debug, Clone)]
pub struct AppArtifacts {
    pub app: Artifact,
    pub verifier: Artifact,
}

impl AppArtifacts {
    pub fn load(app: &Path, verifier: &Path) -> Result<Self> {
        Ok(Self {
            app: Artifact::from_path(app)?,
            verifier: Artifact::from_path(verifier)?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeployedApp {
    pub eid: u32,
    pub app: Address,
    pub verifier: Address,
}

/// Constructor arguments of the read app: protocol endpoint, delegate
/// (owner) and identifier.
pub fn app_constructor_args(chain: &Chain, delegate: Address) -> Vec<u8> {
    (
        chain.lz_endpoint,
        delegate,
        chain.app_identifier.to_string(),
    )
        .abi_encode_params()
}

/// Chain side of a deployment. [`ChainDeployer`] submits through an alloy
/// provider; each call returns once its transaction is mined.
#[async_trait]
pub trait Deployer: Send + Sync {
    /// Deploys `artifact` with `constructor_args` and returns the new address.
    async fn deploy(&self, artifact: &Artifact, constructor_args: &[u8]) -> Result<Address>;

    /// `setVerifier(verifier)` on `app`.
    async fn set_verifier(&self, app: Address, verifier: Address) -> Result<B256>;
}

pub struct ChainDeployer<P, T> {
    provider: P,
    confirmation_timeout: Duration,
    _transport: PhantomData<T>,
}

impl<P, T> ChainDeployer<P, T>
where
    P: Provider<T, Ethereum>,
    T: Transport + Clone,
{
    pub fn new(provider: P, confirmation_timeout: Duration) -> Self {
        Self {
            provider,
            confirmation_timeout,
            _transport: PhantomData,
        }
    }
}

#[async_trait]
impl<P, T> Deployer for ChainDeployer<P, T>
where
    P: Provider<T, Ethereum>,
    T: Transport + Clone,
{
    async fn deploy(&self, artifact: &Artifact, constructor_args: &[u8]) -> Result<Address> {
        let tx = TransactionRequest::default()
            .with_deploy_code(artifact.deployment_code(constructor_args));
        let pending = self.provider.send_transaction(tx).await?;
        let receipt = confirm(pending, self.confirmation_timeout).await?;
        Ok(created_address(receipt.transaction_hash, receipt.contract_address)?)
    }

    async fn set_verifier(&self, app: Address, verifier: Address) -> Result<B256> {
        let pending = MyOAppRead::new(app, &self.provider)
            .setVerifier(verifier)
            .send()
            .await?;
        Ok(confirm(pending, self.confirmation_timeout)
            .await?
            .transaction_hash)
    }
}

/// Address of a contract created by a successfully mined transaction.
pub fn created_address(
    tx_hash: B256,
    contract_address: Option<Address>,
) -> Result<Address, FlowError> {
    contract_address.ok_or(FlowError::NoContractAddress(tx_hash))
}

/// Deploys the app and its verifier on `chain`, then points the app at the
/// verifier. Stops at the first failure; contracts already mined stay.
pub async fn deploy_read_app(
    chain: &Chain,
    deployer: &dyn Deployer,
    delegate: Address,
    artifacts: &AppArtifacts,
) -> Result<DeployedApp> {
    info!(chain = chain.name, identifier = chain.app_identifier, "deploying read app");

    info!(contract = %artifacts.app.name, "deploying contract");
    let app = deployer
        .deploy(&artifacts.app, &app_constructor_args(chain, delegate))
        .await?;
    info!(contract = %artifacts.app.name, address = %app, "deployed contract");

    info!(contract = %artifacts.verifier.name, "deploying contract");
    let verifier = deployer.deploy(&artifacts.verifier, &[]).await?;
    info!(contract = %artifacts.verifier.name, address = %verifier, "deployed contract");

    let tx_hash = deployer.set_verifier(app, verifier).await?;
    info!(chain = chain.name, %app, %verifier, %tx_hash, "verifier set");

    Ok(DeployedApp {
        eid: chain.eid,
        app,
        verifier,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    #[test]
    fn parses_hardhat_artifact() {
        let json = r#"{
            "_format": "hh-sol-artifact-1",
            "contractName": "MyOAppRead",
            "abi": [],
            "bytecode": "0x6080604052",
            "deployedBytecode": "0x6080"
        }"#;
        let artifact = Artifact::from_json(json, "ignored").unwrap();
        assert_eq!(artifact.name, "MyOAppRead");
        assert_eq!(&artifact.bytecode[..], &[0x60, 0x80, 0x60, 0x40, 0x52]);
    }

    #[test]
    fn parses_foundry_artifact() {
        let json = r#"{
            "abi": [],
            "bytecode": { "object": "0x6080", "linkReferences": {} },
            "deployedBytecode": { "object": "0x60" }
        }"#;
        let artifact = Artifact::from_json(json, "Verifier").unwrap();
        assert_eq!(artifact.name, "Verifier");
        assert_eq!(&artifact.bytecode[..], &[0x60, 0x80]);
    }

    #[test]
    fn rejects_interface_artifact() {
        let json = r#"{ "contractName": "IVerifier", "abi": [], "bytecode": "0x" }"#;
        assert!(Artifact::from_json(json, "IVerifier").is_err());
    }

    #[test]
    fn deployment_code_appends_constructor_args() {
        let chain = Chain::sepolia(
            "http://localhost:8545".to_string(),
            address!("6EDCE65403992e310A62460808c4b910D972f10f"),
        );
        let delegate = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
        let args = app_constructor_args(&chain, delegate);

        // endpoint, delegate, string offset, string length, string data
        assert_eq!(args.len(), 5 * 32);
        assert_eq!(&args[12..32], chain.lz_endpoint.as_slice());
        assert_eq!(&args[44..64], delegate.as_slice());
        assert_eq!(&args[128..138], b"oAppRead-A");

        let artifact = Artifact {
            name: "MyOAppRead".to_string(),
            bytecode: Bytes::from_static(&[0x60, 0x80]),
        };
        let code = artifact.deployment_code(&args);
        assert_eq!(code.len(), 2 + args.len());
        assert_eq!(&code[..2], &[0x60, 0x80]);
    }

    #[test]
    fn creation_without_address_is_an_error() {
        let tx_hash = B256::repeat_byte(0x07);
        let created = address!("5FbDB2315678afecb367f032d93F642f64180aa3");

        assert_eq!(created_address(tx_hash, Some(created)).unwrap(), created);
        assert!(matches!(
            created_address(tx_hash, None),
            Err(FlowError::NoContractAddress(hash)) if hash == tx_hash
        ));
    }
}
