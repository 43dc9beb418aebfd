//! Lifecycle record of a user operation accepted by the bundler

use crate::{
    user_operation::{
        TransactionReceiptSummary, UserOperation, UserOperationByHash, UserOperationHash,
        UserOperationReceipt,
    },
    utils::unix_timestamp,
};
use ethers::types::{Address, H256, U256, U64};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of a tracked user operation
///
/// `Pending` is the only non-terminal state. Once a user operation is `Included` or `Failed` it
/// never changes again.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserOperationStatus {
    #[default]
    Pending,
    Included,
    Failed,
}

impl UserOperationStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, UserOperationStatus::Pending)
    }
}

impl fmt::Display for UserOperationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserOperationStatus::Pending => write!(f, "pending"),
            UserOperationStatus::Included => write!(f, "included"),
            UserOperationStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Where (and at which cost) the bundle transaction carrying the user operation landed
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainInclusion {
    pub transaction_hash: H256,
    pub block_hash: Option<H256>,
    pub block_number: Option<U64>,
    pub actual_gas_cost: U256,
    pub actual_gas_used: U256,
}

/// Terminal outcome of a submission
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// The user operation executed successfully on chain
    Included(ChainInclusion),
    /// The submission failed: the transaction reverted, timed out or was dropped, or the user
    /// operation itself reverted (in which case the inclusion is known)
    Failed { reason: String, inclusion: Option<ChainInclusion> },
}

impl Resolution {
    pub fn failed<S: Into<String>>(reason: S) -> Self {
        Resolution::Failed { reason: reason.into(), inclusion: None }
    }

    pub fn status(&self) -> UserOperationStatus {
        match self {
            Resolution::Included(_) => UserOperationStatus::Included,
            Resolution::Failed { .. } => UserOperationStatus::Failed,
        }
    }
}

/// User operation together with its lifecycle state
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedUserOperation {
    pub hash: UserOperationHash,
    pub user_operation: UserOperation,
    pub entry_point: Address,
    /// Unix timestamp (seconds) at which the user operation was accepted
    pub submitted_at: u64,
    pub status: UserOperationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inclusion: Option<ChainInclusion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl TrackedUserOperation {
    /// Creates a freshly accepted (pending) record
    pub fn pending(
        hash: UserOperationHash,
        user_operation: UserOperation,
        entry_point: Address,
    ) -> Self {
        Self {
            hash,
            user_operation,
            entry_point,
            submitted_at: unix_timestamp(),
            status: UserOperationStatus::Pending,
            inclusion: None,
            reason: None,
        }
    }

    /// Applies the terminal outcome, producing the resolved record
    pub fn resolved(self, resolution: Resolution) -> Self {
        let status = resolution.status();
        let (inclusion, reason) = match resolution {
            Resolution::Included(inclusion) => (Some(inclusion), None),
            Resolution::Failed { reason, inclusion } => (inclusion, Some(reason)),
        };
        Self { status, inclusion, reason, ..self }
    }

    pub fn to_user_operation_by_hash(&self) -> UserOperationByHash {
        UserOperationByHash {
            user_operation: self.user_operation.clone(),
            entry_point: self.entry_point,
            transaction_hash: self.inclusion.as_ref().map(|i| i.transaction_hash),
            block_hash: self.inclusion.as_ref().and_then(|i| i.block_hash),
            block_number: self.inclusion.as_ref().and_then(|i| i.block_number),
        }
    }

    /// Builds the receipt of a resolved user operation, `None` while pending
    pub fn to_receipt(&self) -> Option<UserOperationReceipt> {
        if !self.status.is_terminal() {
            return None;
        }

        let success = self.status == UserOperationStatus::Included;
        let inclusion = self.inclusion.clone().unwrap_or_default();
        let transaction_hash = self.inclusion.as_ref().map(|i| i.transaction_hash);

        Some(UserOperationReceipt {
            user_operation_hash: self.hash,
            entry_point: self.entry_point,
            sender: self.user_operation.sender,
            nonce: self.user_operation.nonce,
            paymaster: self.user_operation.paymaster(),
            actual_gas_cost: inclusion.actual_gas_cost,
            actual_gas_used: inclusion.actual_gas_used,
            success,
            reason: self.reason.clone().unwrap_or_default(),
            logs: vec![],
            tx_receipt: TransactionReceiptSummary {
                transaction_hash,
                block_hash: inclusion.block_hash,
                block_number: inclusion.block_number,
                status: if success { U64::one() } else { U64::zero() },
            },
        })
    }
}
