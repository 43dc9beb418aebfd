#[cfg(test)]
pub mod tests {
    use crate::{Mempool, MempoolError};
    use ethers::types::{Address, H256, U256};
    use sluice_primitives::{
        ChainInclusion, Resolution, TrackedUserOperation, UserOperation, UserOperationHash,
        UserOperationStatus,
    };

    pub fn mempool_test_case(mut mempool: Mempool) {
        let ep = Address::random();
        let sender = Address::random();

        let mut hashes = vec![];
        for i in 0..3 {
            let uo = UserOperation { sender, nonce: U256::from(i), ..UserOperation::random() };
            let uo_hash = UserOperationHash(H256::random());
            hashes.push(uo_hash);

            assert!(mempool.insert(TrackedUserOperation::pending(uo_hash, uo.clone(), ep)).unwrap());

            let tracked = mempool.get(&uo_hash).unwrap().unwrap();
            assert_eq!(tracked.user_operation, uo);
            assert_eq!(tracked.status, UserOperationStatus::Pending);
        }
        assert_eq!(mempool.len(), 3);
        assert_eq!(mempool.get_all().unwrap().len(), 3);

        // same hash again is not inserted twice and keeps the original record
        let original = mempool.get(&hashes[0]).unwrap().unwrap();
        assert!(!mempool
            .insert(TrackedUserOperation::pending(hashes[0], UserOperation::random(), ep))
            .unwrap());
        assert_eq!(mempool.get(&hashes[0]).unwrap().unwrap(), original);
        assert_eq!(mempool.len(), 3);

        let inclusion = ChainInclusion {
            transaction_hash: H256::random(),
            block_hash: Some(H256::random()),
            block_number: Some(10.into()),
            actual_gas_cost: 100.into(),
            actual_gas_used: 10.into(),
        };
        let resolved =
            mempool.resolve(&hashes[0], Resolution::Included(inclusion.clone())).unwrap();
        assert_eq!(resolved.status, UserOperationStatus::Included);
        assert_eq!(mempool.get(&hashes[0]).unwrap().unwrap().inclusion, Some(inclusion));

        mempool.resolve(&hashes[1], Resolution::failed("dropped")).unwrap();
        let failed = mempool.get(&hashes[1]).unwrap().unwrap();
        assert_eq!(failed.status, UserOperationStatus::Failed);
        assert_eq!(failed.reason.as_deref(), Some("dropped"));

        // terminal records never change again
        assert_eq!(
            mempool.resolve(&hashes[1], Resolution::Included(ChainInclusion::default())),
            Err(MempoolError::AlreadyResolved {
                hash: hashes[1],
                status: UserOperationStatus::Failed
            })
        );
        assert_eq!(mempool.get(&hashes[1]).unwrap().unwrap(), failed);

        let unknown = UserOperationHash(H256::random());
        assert_eq!(mempool.get(&unknown).unwrap(), None);
        assert_eq!(
            mempool.resolve(&unknown, Resolution::failed("timeout")),
            Err(MempoolError::NotFound { hash: unknown })
        );

        assert_eq!(mempool.get(&hashes[2]).unwrap().unwrap().status, UserOperationStatus::Pending);
    }
}
