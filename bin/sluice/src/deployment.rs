//! Deployment record written by the contract deployment scripts (`deployments/<network>.json`)

use ethers::types::Address;
use expanded_pathbuf::ExpandedPathBuf;
use eyre::eyre;
use serde::Deserialize;
use std::fs;

/// Subset of the deployment record used by the bundler, extra fields are ignored
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentRecord {
    pub network: String,
    /// Chain id, stored as a decimal string
    pub chain_id: String,
    pub contracts: DeployedContracts,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct DeployedContracts {
    #[serde(rename = "EntryPoint")]
    pub entry_point: Address,
}

impl DeploymentRecord {
    pub fn load(path: &ExpandedPathBuf) -> eyre::Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|e| eyre!("failed to read deployment record {}: {e}", path.display()))?;
        serde_json::from_str(&raw)
            .map_err(|e| eyre!("failed to parse deployment record {}: {e}", path.display()))
    }

    pub fn chain_id(&self) -> eyre::Result<u64> {
        self.chain_id
            .parse()
            .map_err(|_| eyre!("deployment record chainId {} is not a number", self.chain_id))
    }
}
