use crate::{error::JsonRpcError, eth_api::EthApiServer};
use async_trait::async_trait;
use ethers::{
    types::{Address, U64},
    utils::to_checksum,
};
use jsonrpsee::core::RpcResult;
use serde::de::DeserializeOwned;
use serde_json::Value;
use sluice_bundler::{Bundler, EntryPointGateway};
use sluice_primitives::{
    UserOperation, UserOperationByHash, UserOperationGasEstimation, UserOperationHash,
    UserOperationPartial, UserOperationReceipt,
};
use std::str::FromStr;
use tracing::trace;

/// EthApiServer implements the ERC-4337 `eth` namespace RPC methods on top of a [Bundler](Bundler)
pub struct EthApiServerImpl<G: EntryPointGateway> {
    pub bundler: Bundler<G>,
}

impl<G: EntryPointGateway> EthApiServerImpl<G> {
    pub fn new(bundler: Bundler<G>) -> Self {
        Self { bundler }
    }
}

/// Decodes a positional parameter, reporting its absence or malformed content by name only
fn decode_param<T: DeserializeOwned>(value: Option<Value>, name: &str) -> Result<T, JsonRpcError> {
    match value {
        None | Some(Value::Null) => Err(JsonRpcError::internal(format!("missing {name}"))),
        Some(value) => serde_json::from_value(value)
            .map_err(|_| JsonRpcError::internal(format!("invalid {name}"))),
    }
}

fn parse_user_operation_hash(user_operation_hash: &str) -> Result<UserOperationHash, JsonRpcError> {
    UserOperationHash::from_str(user_operation_hash).map_err(|_| {
        JsonRpcError::internal(format!("invalid user operation hash {user_operation_hash}"))
    })
}

#[async_trait]
impl<G: EntryPointGateway> EthApiServer for EthApiServerImpl<G> {
    /// Retrieve the chain ID the bundler is configured for.
    ///
    /// # Returns
    /// * `RpcResult<U64>` - The chain ID as a U64.
    async fn chain_id(&self) -> RpcResult<U64> {
        Ok(self.bundler.chain_id().into())
    }

    /// Get the supported entry points for [UserOperations](UserOperation).
    ///
    /// # Returns
    /// * `RpcResult<Vec<String>>` - A array of the entry point addresses as checksummed strings.
    async fn supported_entry_points(&self) -> RpcResult<Vec<String>> {
        Ok(self
            .bundler
            .supported_entry_points()
            .iter()
            .map(|entry_point| to_checksum(entry_point, None))
            .collect())
    }

    /// Send a [UserOperation](UserOperation).
    ///
    /// # Arguments
    /// * `user_operation: Option<Value>` - The [UserOperation](UserOperation) to be sent.
    /// * `entry_point: Option<Value>` - The address of the entry point.
    ///
    /// # Returns
    /// * `RpcResult<UserOperationHash>` - The hash of the sent [UserOperation](UserOperation).
    async fn send_user_operation(
        &self,
        user_operation: Option<Value>,
        entry_point: Option<Value>,
    ) -> RpcResult<UserOperationHash> {
        let user_operation: UserOperation = decode_param(user_operation, "user operation")?;
        let entry_point: Address = decode_param(entry_point, "entry point")?;
        trace!("Received user operation {user_operation:?} for entry point {entry_point:?}");

        Ok(self
            .bundler
            .send_user_operation(user_operation, entry_point)
            .await
            .map_err(JsonRpcError::from)?)
    }

    /// Estimate the gas required for a [UserOperation](UserOperation).
    ///
    /// # Arguments
    /// * `user_operation: Option<Value>` - A partial [UserOperation](UserOperation) for which to estimate the gas.
    /// * `entry_point: Option<Value>` - The address of the entry point.
    ///
    /// # Returns
    /// * `RpcResult<UserOperationGasEstimation>` - The [UserOperationGasEstimation](UserOperationGasEstimation) for the user operation.
    async fn estimate_user_operation_gas(
        &self,
        user_operation: Option<Value>,
        entry_point: Option<Value>,
    ) -> RpcResult<UserOperationGasEstimation> {
        let user_operation: UserOperationPartial = decode_param(user_operation, "user operation")?;
        let entry_point: Address = decode_param(entry_point, "entry point")?;
        let uo: UserOperation = user_operation.into();

        Ok(self
            .bundler
            .estimate_user_operation_gas(&uo, &entry_point)
            .map_err(JsonRpcError::from)?)
    }

    /// Retrieve the receipt of a [UserOperation](UserOperation).
    ///
    /// # Arguments
    /// * `user_operation_hash: String` - The hash of a [UserOperation](UserOperation).
    ///
    /// # Returns
    /// * `RpcResult<Option<UserOperationReceipt>>` - The [UserOperationReceipt](UserOperationReceipt) of the user operation.
    async fn get_user_operation_receipt(
        &self,
        user_operation_hash: String,
    ) -> RpcResult<Option<UserOperationReceipt>> {
        let uo_hash = parse_user_operation_hash(&user_operation_hash)?;

        Ok(self.bundler.get_user_operation_receipt(&uo_hash).map_err(JsonRpcError::from)?)
    }

    /// Retrieve a [UserOperation](UserOperation) by its hash.
    ///
    /// # Arguments
    /// * `user_operation_hash: String` - The hash of a [UserOperation](UserOperation).
    ///
    /// # Returns
    /// * `RpcResult<Option<UserOperationByHash>>` - The [UserOperationByHash](UserOperationByHash) of the user operation.
    async fn get_user_operation_by_hash(
        &self,
        user_operation_hash: String,
    ) -> RpcResult<Option<UserOperationByHash>> {
        let uo_hash = parse_user_operation_hash(&user_operation_hash)?;

        Ok(self.bundler.get_user_operation_by_hash(&uo_hash).map_err(JsonRpcError::from)?)
    }
}
