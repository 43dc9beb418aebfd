use ethers::types::Address;
use sluice_contracts::{EntryPointError, HandleOpsOutcome};
use sluice_primitives::{UserOperation, UserOperationHash};

/// Access to the entry point contract the bundler submits user operations to
#[async_trait::async_trait]
pub trait EntryPointGateway: Send + Sync + 'static {
    /// Address of the entry point contract
    fn address(&self) -> Address;

    /// Computes the hash of the [UserOperation](UserOperation) exactly like the entry point does
    async fn get_user_op_hash(
        &self,
        uo: &UserOperation,
    ) -> Result<UserOperationHash, EntryPointError>;

    /// Submits the [UserOperations](UserOperation) in a single `handleOps` transaction and waits
    /// for it to be confirmed
    ///
    /// # Arguments
    /// * `uos` - User operations of the bundle
    /// * `beneficiary` - Address the entry point refunds the gas to
    async fn handle_ops(
        &self,
        uos: Vec<UserOperation>,
        beneficiary: Address,
    ) -> Result<HandleOpsOutcome, EntryPointError>;
}
