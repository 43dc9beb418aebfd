use crate::MempoolResult;
use dyn_clone::DynClone;
use parking_lot::RwLock;
use sluice_primitives::{Resolution, TrackedUserOperation, UserOperationHash};
use std::{collections::HashMap, sync::Arc};

/// AddResolveUserOp describe the ability to add user operations and move them to a terminal
/// status
pub trait AddResolveUserOp {
    /// Adds a [TrackedUserOperation](TrackedUserOperation) to the mempool
    ///
    /// # Returns
    /// * `Ok(true)` - The user operation was added
    /// * `Ok(false)` - A user operation with the same hash is already tracked (left untouched)
    fn insert(&mut self, uo: TrackedUserOperation) -> MempoolResult<bool>;

    /// Applies the terminal outcome to a pending user operation
    ///
    /// # Returns
    /// * `Ok(TrackedUserOperation)` - The resolved user operation
    /// * `Err(MempoolError)` - If the user operation is unknown or was already resolved
    fn resolve(
        &mut self,
        uo_hash: &UserOperationHash,
        resolution: Resolution,
    ) -> MempoolResult<TrackedUserOperation>;
}

impl<T: AddResolveUserOp> AddResolveUserOp for Arc<RwLock<T>> {
    fn insert(&mut self, uo: TrackedUserOperation) -> MempoolResult<bool> {
        self.write().insert(uo)
    }

    fn resolve(
        &mut self,
        uo_hash: &UserOperationHash,
        resolution: Resolution,
    ) -> MempoolResult<TrackedUserOperation> {
        self.write().resolve(uo_hash, resolution)
    }
}

/// Trait representing read operations on tracked user operations.
pub trait UserOperationOp {
    /// Retrieves a snapshot of the user operation by its hash, `Ok(None)` if it is unknown
    fn get_by_uo_hash(
        &self,
        uo_hash: &UserOperationHash,
    ) -> MempoolResult<Option<TrackedUserOperation>>;

    /// Retrieves all tracked user operations (in no particular order)
    fn get_all(&self) -> MempoolResult<Vec<TrackedUserOperation>>;

    /// Number of tracked user operations
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: UserOperationOp> UserOperationOp for Arc<RwLock<T>> {
    fn get_by_uo_hash(
        &self,
        uo_hash: &UserOperationHash,
    ) -> MempoolResult<Option<TrackedUserOperation>> {
        self.read().get_by_uo_hash(uo_hash)
    }

    fn get_all(&self) -> MempoolResult<Vec<TrackedUserOperation>> {
        self.read().get_all()
    }

    fn len(&self) -> usize {
        self.read().len()
    }
}

pub trait UserOperationAct: AddResolveUserOp + UserOperationOp + Send + Sync + DynClone {}

dyn_clone::clone_trait_object!(UserOperationAct);
impl<T> UserOperationAct for T where T: AddResolveUserOp + UserOperationOp + Send + Sync + Clone {}

/// In-memory storage shared between the RPC handlers and the submission tasks
pub type MemoryMempool = Arc<RwLock<HashMap<UserOperationHash, TrackedUserOperation>>>;

/// Store of the user operations accepted by the bundler
///
/// Clones share the underlying storage as long as the storage itself is shared (as
/// [MemoryMempool] is).
#[derive(Clone)]
pub struct Mempool {
    user_operations: Box<dyn UserOperationAct>,
}

impl Mempool {
    pub fn new(user_operations: Box<dyn UserOperationAct>) -> Self {
        Self { user_operations }
    }

    /// Mempool backed by a [MemoryMempool]
    pub fn memory() -> Self {
        Self::new(Box::new(MemoryMempool::default()))
    }

    pub fn insert(&mut self, uo: TrackedUserOperation) -> MempoolResult<bool> {
        self.user_operations.insert(uo)
    }

    pub fn resolve(
        &mut self,
        uo_hash: &UserOperationHash,
        resolution: Resolution,
    ) -> MempoolResult<TrackedUserOperation> {
        self.user_operations.resolve(uo_hash, resolution)
    }

    pub fn get(&self, uo_hash: &UserOperationHash) -> MempoolResult<Option<TrackedUserOperation>> {
        self.user_operations.get_by_uo_hash(uo_hash)
    }

    pub fn get_all(&self) -> MempoolResult<Vec<TrackedUserOperation>> {
        self.user_operations.get_all()
    }

    pub fn len(&self) -> usize {
        self.user_operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.user_operations.is_empty()
    }
}

impl std::fmt::Debug for Mempool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mempool").field("len", &self.len()).finish()
    }
}
