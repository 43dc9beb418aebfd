use ethers::types::U64;
use jsonrpsee::{core::RpcResult, proc_macros::rpc};
use serde_json::Value;
use sluice_primitives::{
    UserOperationByHash, UserOperationGasEstimation, UserOperationHash, UserOperationReceipt,
};

/// The ERC-4337 `eth` namespace RPC methods trait
///
/// Operation parameters arrive as raw JSON and are decoded by the implementation, so a malformed
/// or missing parameter is reported as an internal error (`-32603`).
#[rpc(server, namespace = "eth")]
pub trait EthApi {
    /// Retrieve the current [EIP-155](https://eips.ethereum.org/EIPS/eip-155) chain ID.
    ///
    /// # Returns
    /// * `RpcResult<U64>` - The chain ID as a U64.
    #[method(name = "chainId")]
    async fn chain_id(&self) -> RpcResult<U64>;

    /// Get the supported entry points for user operations.
    ///
    /// # Returns
    /// * `RpcResult<Vec<String>>` - A array of the entry point addresses as checksummed strings.
    #[method(name = "supportedEntryPoints")]
    async fn supported_entry_points(&self) -> RpcResult<Vec<String>>;

    /// Send a user operation.
    ///
    /// Returns as soon as the user operation is accepted; the bundle transaction is submitted in
    /// the background.
    ///
    /// # Arguments
    /// * `user_operation: Option<Value>` - The user operation to be sent.
    /// * `entry_point: Option<Value>` - The address of the entry point.
    ///
    /// # Returns
    /// * `RpcResult<UserOperationHash>` - The hash of the sent user operation.
    #[method(name = "sendUserOperation")]
    async fn send_user_operation(
        &self,
        user_operation: Option<Value>,
        entry_point: Option<Value>,
    ) -> RpcResult<UserOperationHash>;

    /// Estimate the gas required for a user operation.
    ///
    /// # Arguments
    /// * `user_operation: Option<Value>` - A partial user operation for which to estimate the gas.
    /// * `entry_point: Option<Value>` - The address of the entry point.
    ///
    /// # Returns
    /// * `RpcResult<UserOperationGasEstimation>` - The estimated gas for the user operation.
    #[method(name = "estimateUserOperationGas")]
    async fn estimate_user_operation_gas(
        &self,
        user_operation: Option<Value>,
        entry_point: Option<Value>,
    ) -> RpcResult<UserOperationGasEstimation>;

    /// Retrieve the receipt of a user operation.
    ///
    /// # Arguments
    /// * `user_operation_hash: String` - The hash of a user operation.
    ///
    /// # Returns
    /// * `RpcResult<Option<UserOperationReceipt>>` - The receipt of the user operation, or None if it does not exist or is still pending.
    #[method(name = "getUserOperationReceipt")]
    async fn get_user_operation_receipt(
        &self,
        user_operation_hash: String,
    ) -> RpcResult<Option<UserOperationReceipt>>;

    /// Retrieve a user operation by its hash.
    ///
    /// # Arguments
    /// * `user_operation_hash: String` - The hash of the user operation.
    ///
    /// # Returns
    /// * `RpcResult<Option<UserOperationByHash>>` - The user operation associated with the hash, or None if it does not exist.
    #[method(name = "getUserOperationByHash")]
    async fn get_user_operation_by_hash(
        &self,
        user_operation_hash: String,
    ) -> RpcResult<Option<UserOperationByHash>>;
}
