use crate::gen::entry_point_api;
use ethers::types::H256;
use sluice_primitives::UserOperation;

impl From<UserOperation> for entry_point_api::PackedUserOperation {
    fn from(uo: UserOperation) -> Self {
        Self {
            sender: uo.sender,
            nonce: uo.nonce,
            init_code: uo.init_code,
            call_data: uo.call_data,
            account_gas_limits: uo.account_gas_limits.0,
            pre_verification_gas: uo.pre_verification_gas,
            gas_fees: uo.gas_fees.0,
            paymaster_and_data: uo.paymaster_and_data,
            signature: uo.signature,
        }
    }
}

impl From<entry_point_api::PackedUserOperation> for UserOperation {
    fn from(uo: entry_point_api::PackedUserOperation) -> Self {
        Self {
            sender: uo.sender,
            nonce: uo.nonce,
            init_code: uo.init_code,
            call_data: uo.call_data,
            account_gas_limits: H256(uo.account_gas_limits),
            pre_verification_gas: uo.pre_verification_gas,
            gas_fees: H256(uo.gas_fees),
            paymaster_and_data: uo.paymaster_and_data,
            signature: uo.signature,
        }
    }
}
