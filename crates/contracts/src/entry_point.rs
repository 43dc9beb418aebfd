pub use super::{
    error::EntryPointError,
    gen::{EntryPointAPI, EntryPointAPIEvents},
};
use super::{
    error::decode_revert_error,
    gen::entry_point_api::{EntryPointAPIErrors, PackedUserOperation},
};
use crate::error::decode_revert_string;
use ethers::{
    contract::{parse_log, ContractError},
    providers::Middleware,
    types::{Address, TransactionReceipt, H256, U256, U64},
};
use std::{sync::Arc, time::Duration};

const DEFAULT_CONFIRMATIONS: usize = 1;
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);

/// Outcome of a single user operation, as reported by the entry point events
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserOperationOutcome {
    pub user_op_hash: H256,
    pub sender: Address,
    pub paymaster: Address,
    pub nonce: U256,
    pub success: bool,
    pub actual_gas_cost: U256,
    pub actual_gas_used: U256,
    /// Decoded `UserOperationRevertReason` (only present if the execution reverted)
    pub revert_reason: Option<String>,
}

/// Outcome of a confirmed `handleOps` transaction
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HandleOpsOutcome {
    pub transaction_hash: H256,
    pub block_hash: Option<H256>,
    pub block_number: Option<U64>,
    pub gas_used: Option<U256>,
    /// The bundle transaction itself reverted (receipt status 0)
    pub reverted: bool,
    pub user_operations: Vec<UserOperationOutcome>,
}

impl HandleOpsOutcome {
    /// Collects the per user operation outcomes from the logs the entry point emitted
    pub fn from_receipt(entry_point: Address, receipt: &TransactionReceipt) -> Self {
        let mut user_operations: Vec<UserOperationOutcome> = vec![];
        let mut revert_reasons: Vec<(H256, String)> = vec![];

        for log in receipt.logs.iter().filter(|log| log.address == entry_point) {
            // entry point emits other events too (deposits, account deployments, ...)
            match parse_log::<EntryPointAPIEvents>(log.clone()) {
                Ok(EntryPointAPIEvents::UserOperationEventFilter(event)) => {
                    user_operations.push(UserOperationOutcome {
                        user_op_hash: H256(event.user_op_hash),
                        sender: event.sender,
                        paymaster: event.paymaster,
                        nonce: event.nonce,
                        success: event.success,
                        actual_gas_cost: event.actual_gas_cost,
                        actual_gas_used: event.actual_gas_used,
                        revert_reason: None,
                    })
                }
                Ok(EntryPointAPIEvents::UserOperationRevertReasonFilter(event)) => {
                    let reason = decode_revert_string(event.revert_reason.clone())
                        .unwrap_or_else(|| event.revert_reason.to_string());
                    revert_reasons.push((H256(event.user_op_hash), reason));
                }
                Err(_) => {}
            }
        }

        for (hash, reason) in revert_reasons {
            if let Some(uo) = user_operations.iter_mut().find(|uo| uo.user_op_hash == hash) {
                uo.revert_reason = Some(reason);
            }
        }

        Self {
            transaction_hash: receipt.transaction_hash,
            block_hash: receipt.block_hash,
            block_number: receipt.block_number,
            gas_used: receipt.gas_used,
            reverted: receipt.status == Some(U64::zero()),
            user_operations,
        }
    }

    pub fn user_operation(&self, user_op_hash: &H256) -> Option<&UserOperationOutcome> {
        self.user_operations.iter().find(|uo| &uo.user_op_hash == user_op_hash)
    }
}

#[derive(Clone)]
pub struct EntryPoint<M: Middleware + 'static> {
    address: Address,
    entry_point_api: EntryPointAPI<M>,
    confirmations: usize,
    poll_interval: Duration,
}

impl<M: Middleware + 'static> EntryPoint<M> {
    pub fn new(eth_client: Arc<M>, address: Address) -> Self {
        let entry_point_api = EntryPointAPI::new(address, eth_client);
        Self {
            address,
            entry_point_api,
            confirmations: DEFAULT_CONFIRMATIONS,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Number of blocks to wait for before the bundle transaction is considered confirmed
    pub fn with_confirmations(mut self, confirmations: usize) -> Self {
        self.confirmations = confirmations;
        self
    }

    /// Interval at which the bundle transaction receipt is polled
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn address(&self) -> Address {
        self.address
    }

    fn deserialize_error_msg(
        err: ContractError<M>,
    ) -> Result<EntryPointAPIErrors, EntryPointError> {
        match err {
            ContractError::DecodingError(e) => {
                Err(EntryPointError::Decode { inner: e.to_string() })
            }
            ContractError::AbiError(e) => Err(EntryPointError::ABI { inner: e.to_string() }),
            ContractError::MiddlewareError { e } => EntryPointError::from_middleware_error::<M>(e),
            ContractError::ProviderError { e } => EntryPointError::from_provider_error(&e),
            ContractError::Revert(data) => decode_revert_error(data),
            _ => Err(EntryPointError::Other { inner: err.to_string() }),
        }
    }

    fn contract_error(err: ContractError<M>) -> EntryPointError {
        match Self::deserialize_error_msg(err) {
            Ok(op) => op.into(),
            Err(err) => err,
        }
    }

    /// Hash of the user operation, computed by the entry point contract itself
    pub async fn get_user_op_hash<U: Into<PackedUserOperation>>(
        &self,
        uo: U,
    ) -> Result<H256, EntryPointError> {
        self.entry_point_api
            .get_user_op_hash(uo.into())
            .call()
            .await
            .map(H256)
            .map_err(Self::contract_error)
    }

    /// Signs and broadcasts a `handleOps` transaction and waits until it is confirmed
    ///
    /// A bundle that would revert is usually rejected by the node already while estimating gas,
    /// which surfaces as [EntryPointError::FailedOp].
    pub async fn handle_ops<U: Into<PackedUserOperation>>(
        &self,
        uos: Vec<U>,
        beneficiary: Address,
    ) -> Result<HandleOpsOutcome, EntryPointError> {
        let call = self
            .entry_point_api
            .handle_ops(uos.into_iter().map(|u| u.into()).collect(), beneficiary);

        let pending = call.send().await.map_err(Self::contract_error)?;
        let tx_hash = pending.tx_hash();

        let receipt = pending
            .interval(self.poll_interval)
            .confirmations(self.confirmations)
            .await
            .map_err(|err| EntryPointError::Provider { inner: err.to_string() })?
            .ok_or(EntryPointError::Dropped { tx_hash })?;

        Ok(HandleOpsOutcome::from_receipt(self.address, &receipt))
    }
}
