use super::{UserOperation, UserOperationHash};
use crate::utils::as_checksum_addr;
use ethers::types::{Address, Log, H256, U256, U64};
use serde::{Deserialize, Serialize};

/// Summary of the bundle transaction that carried the user operation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceiptSummary {
    pub transaction_hash: Option<H256>,
    pub block_hash: Option<H256>,
    pub block_number: Option<U64>,
    /// 1 if the user operation executed successfully, 0 otherwise
    pub status: U64,
}

/// Receipt of the user operation (returned from the RPC endpoint eth_getUserOperationReceipt)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserOperationReceipt {
    #[serde(rename = "userOpHash")]
    pub user_operation_hash: UserOperationHash,
    #[serde(serialize_with = "as_checksum_addr")]
    pub entry_point: Address,
    #[serde(serialize_with = "as_checksum_addr")]
    pub sender: Address,
    pub nonce: U256,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paymaster: Option<Address>,
    pub actual_gas_cost: U256,
    pub actual_gas_used: U256,
    pub success: bool,
    pub reason: String,
    pub logs: Vec<Log>,
    #[serde(rename = "receipt")]
    pub tx_receipt: TransactionReceiptSummary,
}

/// Struct that is returned from the RPC endpoint eth_getUserOperationByHash
///
/// Transaction and block fields stay `null` until the user operation leaves the pending state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserOperationByHash {
    pub user_operation: UserOperation,
    #[serde(serialize_with = "as_checksum_addr")]
    pub entry_point: Address,
    pub transaction_hash: Option<H256>,
    pub block_hash: Option<H256>,
    pub block_number: Option<U64>,
}
