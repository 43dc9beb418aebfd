//! In-memory store of the user operations accepted by the bundler, keyed by user operation hash.

mod error;
mod memory;
mod mempool;
mod utils;

pub use error::{MempoolError, MempoolResult};
pub use mempool::{AddResolveUserOp, Mempool, MemoryMempool, UserOperationAct, UserOperationOp};
