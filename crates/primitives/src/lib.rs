//! Account abstraction (ERC-4337) primitive types
//!
//! This crate contains the user operation types, the records tracked by the bundler and
//! helper functions shared by the other Sluice crates.

pub mod constants;
mod tracked;
mod user_operation;
mod utils;
mod wallet;

pub use tracked::{ChainInclusion, Resolution, TrackedUserOperation, UserOperationStatus};
pub use user_operation::{
    TransactionReceiptSummary, UserOperation, UserOperationByHash, UserOperationGasEstimation,
    UserOperationHash, UserOperationPartial, UserOperationReceipt,
};
pub use utils::{
    as_checksum_addr, get_address, pack_uint128, unix_timestamp, unpack_uint128,
};
pub use wallet::Wallet;
