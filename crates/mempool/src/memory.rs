use crate::{
    mempool::{AddResolveUserOp, UserOperationOp},
    MempoolError, MempoolResult,
};
use sluice_primitives::{Resolution, TrackedUserOperation, UserOperationHash};
use std::collections::{hash_map::Entry, HashMap};

impl AddResolveUserOp for HashMap<UserOperationHash, TrackedUserOperation> {
    fn insert(&mut self, uo: TrackedUserOperation) -> MempoolResult<bool> {
        match self.entry(uo.hash) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(entry) => {
                entry.insert(uo);
                Ok(true)
            }
        }
    }

    fn resolve(
        &mut self,
        uo_hash: &UserOperationHash,
        resolution: Resolution,
    ) -> MempoolResult<TrackedUserOperation> {
        let uo = self.get_mut(uo_hash).ok_or(MempoolError::NotFound { hash: *uo_hash })?;

        if uo.status.is_terminal() {
            return Err(MempoolError::AlreadyResolved { hash: *uo_hash, status: uo.status });
        }

        *uo = uo.clone().resolved(resolution);
        Ok(uo.clone())
    }
}

impl UserOperationOp for HashMap<UserOperationHash, TrackedUserOperation> {
    fn get_by_uo_hash(
        &self,
        uo_hash: &UserOperationHash,
    ) -> MempoolResult<Option<TrackedUserOperation>> {
        Ok(self.get(uo_hash).cloned())
    }

    fn get_all(&self) -> MempoolResult<Vec<TrackedUserOperation>> {
        Ok(self.values().cloned().collect())
    }

    fn len(&self) -> usize {
        HashMap::len(self)
    }
}
