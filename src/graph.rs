//! Omni-graph declaration: which app lives on which endpoint, and which
//! directed peer links the wiring toolchain should establish.
//!
//! The declaration is plain data. [`OmniGraph::validate`] exists for
//! callers that want to check it; nothing here enforces it.

use std::{collections::HashSet, fmt, path::Path};

use eyre::{Result, WrapErr};
use serde::{Deserialize, Serialize};

pub const SEPOLIA_V2_TESTNET: u32 = 40161;
pub const BASESEP_V2_TESTNET: u32 = 40245;

pub const APP_CONTRACT_NAME: &str = "MyOApp";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OmniPoint {
    pub eid: u32,
    pub contract_name: String,
}

impl OmniPoint {
    pub fn new(eid: u32, contract_name: impl Into<String>) -> Self {
        Self {
            eid,
            contract_name: contract_name.into(),
        }
    }
}

impl fmt::Display for OmniPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.contract_name, self.eid)
    }
}

/// Optional per-contract settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OAppSettings {
    /// Maximum fee, in basis points, the contract may charge callers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caller_bps_cap: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractEntry {
    pub contract: OmniPoint,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<OAppSettings>,
}

/// `from` accepts `to` as a peer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub from: OmniPoint,
    pub to: OmniPoint,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OmniGraph {
    pub contracts: Vec<ContractEntry>,
    pub connections: Vec<Connection>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphIssue {
    UndeclaredEndpoint { connection: usize, point: OmniPoint },
    DuplicateContract(OmniPoint),
    SelfConnection(OmniPoint),
}

impl fmt::Display for GraphIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphIssue::UndeclaredEndpoint { connection, point } => {
                write!(f, "connection #{connection} references undeclared {point}")
            }
            GraphIssue::DuplicateContract(point) => write!(f, "{point} is declared twice"),
            GraphIssue::SelfConnection(point) => write!(f, "{point} is connected to itself"),
        }
    }
}

/// The Sepolia <-> Base Sepolia graph.
pub fn declaration() -> OmniGraph {
    let sepolia = OmniPoint::new(SEPOLIA_V2_TESTNET, APP_CONTRACT_NAME);
    let base = OmniPoint::new(BASESEP_V2_TESTNET, APP_CONTRACT_NAME);

    OmniGraph {
        contracts: vec![
            ContractEntry {
                contract: base.clone(),
                config: None,
            },
            ContractEntry {
                contract: sepolia.clone(),
                config: None,
            },
        ],
        connections: vec![
            Connection {
                from: base.clone(),
                to: sepolia.clone(),
            },
            Connection {
                from: sepolia,
                to: base,
            },
        ],
    }
}

impl OmniGraph {
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read {}", path.display()))?;
        serde_json::from_str(&content)
            .wrap_err_with(|| format!("failed to parse graph {}", path.display()))
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn contains(&self, point: &OmniPoint) -> bool {
        self.contracts.iter().any(|entry| &entry.contract == point)
    }

    /// Every problem found, in declaration order. Empty means consistent.
    pub fn validate(&self) -> Vec<GraphIssue> {
        let mut issues = Vec::new();

        let mut seen = HashSet::new();
        for entry in &self.contracts {
            if !seen.insert(&entry.contract) {
                issues.push(GraphIssue::DuplicateContract(entry.contract.clone()));
            }
        }

        for (index, connection) in self.connections.iter().enumerate() {
            for point in [&connection.from, &connection.to] {
                if !self.contains(point) {
                    issues.push(GraphIssue::UndeclaredEndpoint {
                        connection: index,
                        point: point.clone(),
                    });
                }
            }
            if connection.from == connection.to {
                issues.push(GraphIssue::SelfConnection(connection.from.clone()));
            }
        }

        issues
    }
}
