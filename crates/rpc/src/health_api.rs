use ethers::types::Address;
use jsonrpsee::{core::RpcResult, proc_macros::rpc};
use serde::{Deserialize, Serialize};
use sluice_primitives::as_checksum_addr;

/// Health of the bundler, also served on `GET /health`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Health {
    pub status: String,
    pub bundler: String,
    #[serde(serialize_with = "as_checksum_addr")]
    pub entry_point: Address,
}

/// The `system` namespace RPC methods trait
#[rpc(client, server, namespace = "system")]
pub trait HealthApi {
    /// Report whether the bundler is up.
    ///
    /// # Returns
    /// * `RpcResult<Health>` - The [Health](Health) of the bundler.
    #[method(name = "health")]
    async fn health(&self) -> RpcResult<Health>;
}
