//! Basic transaction type for account abstraction (ERC-4337)

mod hash;
mod receipt;

use crate::utils::{as_checksum_addr, get_address, pack_uint128, unpack_uint128};
use ethers::{
    abi::AbiEncode,
    contract::{EthAbiCodec, EthAbiType},
    types::{Address, Bytes, H256, U256},
};
pub use hash::UserOperationHash;
pub use receipt::{TransactionReceiptSummary, UserOperationByHash, UserOperationReceipt};
use serde::{Deserialize, Serialize};

/// User operation in the packed layout of the entry point v0.7
///
/// Fields missing from the JSON payload default to zero/empty, so that incomplete user
/// operations are rejected by the bundler's validation instead of by the deserializer.
#[derive(
    Default,
    Clone,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    EthAbiCodec,
    EthAbiType,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "camelCase", default)]
pub struct UserOperation {
    /// Sender of the user operation
    #[serde(serialize_with = "as_checksum_addr")]
    pub sender: Address,

    /// Nonce (anti replay protection)
    pub nonce: U256,

    /// Init code for the account (needed if account not yet deployed and needs to be created)
    pub init_code: Bytes,

    /// The data that is passed to the sender during the main execution call
    pub call_data: Bytes,

    /// Verification gas limit (high 128 bits) and call gas limit (low 128 bits)
    pub account_gas_limits: H256,

    /// The amount of gas to pay bundler to compensate for the pre-verification execution and
    /// calldata
    pub pre_verification_gas: U256,

    /// Max priority fee per gas (high 128 bits) and max fee per gas (low 128 bits)
    pub gas_fees: H256,

    /// Address of paymaster sponsoring the user operation, followed by extra data to send to the
    /// paymaster (can be empty)
    pub paymaster_and_data: Bytes,

    /// Data passed to the account along with the nonce during the verification step
    pub signature: Bytes,
}

impl UserOperation {
    /// Packs the user operation into bytes
    pub fn pack(&self) -> Bytes {
        self.clone().encode().into()
    }

    /// The amount of gas to allocate for the verification step
    pub fn verification_gas_limit(&self) -> U256 {
        unpack_uint128(self.account_gas_limits.as_bytes()).0
    }

    /// The amount of gas to allocate for the main execution call
    pub fn call_gas_limit(&self) -> U256 {
        unpack_uint128(self.account_gas_limits.as_bytes()).1
    }

    /// Maximum priority fee per gas (similar to EIP-1559)
    pub fn max_priority_fee_per_gas(&self) -> U256 {
        unpack_uint128(self.gas_fees.as_bytes()).0
    }

    /// Maximum fee per gas (similar to EIP-1559)
    pub fn max_fee_per_gas(&self) -> U256 {
        unpack_uint128(self.gas_fees.as_bytes()).1
    }

    /// Paymaster sponsoring the user operation, if any
    pub fn paymaster(&self) -> Option<Address> {
        get_address(&self.paymaster_and_data)
    }

    // Builder pattern helpers

    /// Sets the sender of the user operation
    pub fn sender(mut self, sender: Address) -> Self {
        self.sender = sender;
        self
    }

    /// Sets the nonce of the user operation
    pub fn nonce(mut self, nonce: U256) -> Self {
        self.nonce = nonce;
        self
    }

    /// Sets the init code of the user operation
    pub fn init_code(mut self, init_code: Bytes) -> Self {
        self.init_code = init_code;
        self
    }

    /// Sets the call data of the user operation
    pub fn call_data(mut self, call_data: Bytes) -> Self {
        self.call_data = call_data;
        self
    }

    /// Packs and sets the verification and call gas limits of the user operation
    pub fn account_gas_limits(mut self, verification_gas_limit: U256, call_gas_limit: U256) -> Self {
        self.account_gas_limits = pack_uint128(verification_gas_limit, call_gas_limit).into();
        self
    }

    /// Sets the pre-verification gas of the user operation
    pub fn pre_verification_gas(mut self, pre_verification_gas: U256) -> Self {
        self.pre_verification_gas = pre_verification_gas;
        self
    }

    /// Packs and sets the max priority fee per gas and max fee per gas of the user operation
    pub fn gas_fees(mut self, max_priority_fee_per_gas: U256, max_fee_per_gas: U256) -> Self {
        self.gas_fees = pack_uint128(max_priority_fee_per_gas, max_fee_per_gas).into();
        self
    }

    /// Sets the paymaster and data of the user operation
    pub fn paymaster_and_data(mut self, paymaster_and_data: Bytes) -> Self {
        self.paymaster_and_data = paymaster_and_data;
        self
    }

    /// Sets the signature of the user operation
    pub fn signature(mut self, signature: Bytes) -> Self {
        self.signature = signature;
        self
    }

    /// Creates random user operation (for testing purposes)
    #[cfg(feature = "test-utils")]
    pub fn random() -> Self {
        UserOperation::default()
            .sender(Address::random())
            .account_gas_limits(100_000.into(), 100_000.into())
            .pre_verification_gas(21_000.into())
            .gas_fees(1_000_000_000.into(), 2_000_000_000_u64.into())
            .signature(vec![0x1b; 65].into())
    }
}

/// User operation with all fields being optional
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserOperationPartial {
    #[serde(default)]
    pub sender: Option<Address>,
    #[serde(default)]
    pub nonce: Option<U256>,
    #[serde(default)]
    pub init_code: Option<Bytes>,
    #[serde(default)]
    pub call_data: Option<Bytes>,
    #[serde(default)]
    pub account_gas_limits: Option<H256>,
    #[serde(default)]
    pub pre_verification_gas: Option<U256>,
    #[serde(default)]
    pub gas_fees: Option<H256>,
    #[serde(default)]
    pub paymaster_and_data: Option<Bytes>,
    #[serde(default)]
    pub signature: Option<Bytes>,
}

impl From<UserOperationPartial> for UserOperation {
    fn from(user_operation: UserOperationPartial) -> Self {
        Self {
            sender: user_operation.sender.unwrap_or_default(),
            nonce: user_operation.nonce.unwrap_or_default(),
            init_code: user_operation.init_code.unwrap_or_default(),
            call_data: user_operation.call_data.unwrap_or_default(),
            account_gas_limits: user_operation.account_gas_limits.unwrap_or_default(),
            pre_verification_gas: user_operation.pre_verification_gas.unwrap_or_default(),
            gas_fees: user_operation.gas_fees.unwrap_or_default(),
            paymaster_and_data: user_operation.paymaster_and_data.unwrap_or_default(),
            signature: user_operation.signature.unwrap_or_default(),
        }
    }
}

/// Gas estimations for user operation (returned from the RPC endpoint
/// eth_estimateUserOperationGas)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserOperationGasEstimation {
    pub pre_verification_gas: U256,
    pub verification_gas_limit: U256,
    pub call_gas_limit: U256,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn user_operation_gas_accessors() {
        let uo = UserOperation::default()
            .account_gas_limits(361_460.into(), 33_100.into())
            .gas_fees(1_695_000_000.into(), 1_695_000_030_u64.into());

        assert_eq!(uo.verification_gas_limit(), 361_460.into());
        assert_eq!(uo.call_gas_limit(), 33_100.into());
        assert_eq!(uo.max_priority_fee_per_gas(), 1_695_000_000.into());
        assert_eq!(uo.max_fee_per_gas(), 1_695_000_030_u64.into());
    }

    #[test]
    fn user_operation_from_packed_json() {
        // shape produced by the web client for the entry point v0.7
        let uo: UserOperation = serde_json::from_value(json!({
            "sender": "0x1F9090AAE28B8A3DCEADF281B0F12828E676C326",
            "nonce": "0x0",
            "initCode": "0x",
            "callData": "0xb61d27f6",
            "accountGasLimits": "0x00000000000000000000000000030d4000000000000000000000000000030d40",
            "preVerificationGas": "0xc350",
            "gasFees": "0x0000000000000000000000003b9aca0000000000000000000000000077359400",
            "paymasterAndData": "0x",
            "signature": "0xdeadbeef"
        }))
        .unwrap();

        assert_eq!(uo.sender, "0x1F9090AAE28B8A3DCEADF281B0F12828E676C326".parse().unwrap());
        assert_eq!(uo.nonce, U256::zero());
        assert!(uo.init_code.is_empty());
        assert_eq!(uo.verification_gas_limit(), 200_000.into());
        assert_eq!(uo.call_gas_limit(), 200_000.into());
        assert_eq!(uo.pre_verification_gas, 50_000.into());
        assert_eq!(uo.max_priority_fee_per_gas(), 1_000_000_000.into());
        assert_eq!(uo.max_fee_per_gas(), 2_000_000_000_u64.into());
        assert_eq!(uo.signature, Bytes::from(vec![0xde, 0xad, 0xbe, 0xef]));
        assert_eq!(uo.paymaster(), None);
    }

    #[test]
    fn user_operation_missing_fields_default() {
        let uo: UserOperation = serde_json::from_value(json!({ "callData": "0x" })).unwrap();
        assert!(uo.sender.is_zero());
        assert!(uo.signature.is_empty());
        assert!(uo.account_gas_limits.is_zero());
    }

    #[test]
    fn user_operation_serializes_camel_case_checksum() {
        let uo = UserOperation::default()
            .sender("0x1f9090aae28b8a3dceadf281b0f12828e676c326".parse().unwrap())
            .nonce(1.into());
        let value = serde_json::to_value(&uo).unwrap();

        assert_eq!(value["sender"], "0x1f9090aaE28b8a3dCeaDf281B0F12828e676c326");
        assert_eq!(value["nonce"], "0x1");
        assert!(value.get("accountGasLimits").is_some());
        assert!(value.get("paymasterAndData").is_some());
    }

    #[test]
    fn user_operation_partial_into_user_operation() {
        let partial: UserOperationPartial = serde_json::from_value(json!({
            "sender": "0x1F9090AAE28B8A3DCEADF281B0F12828E676C326",
            "callData": "0x01"
        }))
        .unwrap();
        let uo = UserOperation::from(partial);

        assert_eq!(uo.call_data, Bytes::from(vec![0x01]));
        assert_eq!(uo.nonce, U256::zero());
        assert!(uo.signature.is_empty());
    }

    #[test]
    fn gas_estimation_hex_quantities() {
        let estimation = UserOperationGasEstimation {
            pre_verification_gas: 100_000.into(),
            verification_gas_limit: 100_000.into(),
            call_gas_limit: 100_000.into(),
        };
        assert_eq!(
            serde_json::to_value(estimation).unwrap(),
            json!({
                "preVerificationGas": "0x186a0",
                "verificationGasLimit": "0x186a0",
                "callGasLimit": "0x186a0"
            })
        );
    }
}
