//! Bindings for the account abstraction (ERC-4337) entry point contract

pub mod entry_point;
mod error;
mod gen;
mod utils;

pub use entry_point::{EntryPoint, HandleOpsOutcome, UserOperationOutcome};
pub use error::{decode_revert_string, EntryPointError};
pub use gen::{
    FailedOp, FailedOpWithRevert, PackedUserOperation, UserOperationEventFilter,
    UserOperationRevertReasonFilter,
};
