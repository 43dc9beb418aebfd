use ethers::types::Address;
use sluice_contracts::EntryPointError;
use sluice_mempool::MempoolError;
use thiserror::Error;

/// Errors surfaced synchronously to the caller of the bundler
///
/// Failures of the bundle submission itself are never returned here; they are recorded on the
/// tracked user operation instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BundlerError {
    /// The entry point is not the one the bundler is configured for
    #[error("unsupported entry point {entry_point:?}")]
    UnsupportedEntryPoint { entry_point: Address },

    /// The user operation is malformed
    #[error("invalid user operation: {inner}")]
    InvalidUserOperation { inner: String },

    /// The entry point could not compute the user operation hash
    #[error("failed to compute user operation hash: {0}")]
    Hash(EntryPointError),

    /// Mempool error
    #[error(transparent)]
    Mempool(#[from] MempoolError),
}
