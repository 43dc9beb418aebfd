use sluice_primitives::{UserOperationHash, UserOperationStatus};
use thiserror::Error;

pub type MempoolResult<T> = Result<T, MempoolError>;

/// Mempool error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MempoolError {
    /// No user operation is tracked under the hash
    #[error("user operation {hash} not found")]
    NotFound { hash: UserOperationHash },

    /// The user operation already reached a terminal status
    #[error("user operation {hash} already {status}")]
    AlreadyResolved { hash: UserOperationHash, status: UserOperationStatus },
}
