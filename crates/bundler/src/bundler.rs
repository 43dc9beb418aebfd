use crate::{errors::BundlerError, gateway::EntryPointGateway};
use ethers::types::Address;
use sluice_contracts::HandleOpsOutcome;
use sluice_mempool::Mempool;
use sluice_primitives::{
    constants::{bundler::CONFIRMATION_TIMEOUT, gas},
    ChainInclusion, Resolution, TrackedUserOperation, UserOperation, UserOperationByHash,
    UserOperationGasEstimation, UserOperationHash, UserOperationReceipt,
};
use std::{sync::Arc, time::Duration};
use tracing::{debug, info, trace, warn};

/// The `Bundler` accepts user operations, submits each of them to the entry point in its own
/// bundle and tracks them until the bundle transaction is confirmed (or fails)
pub struct Bundler<G: EntryPointGateway> {
    /// Entry point the user operations are submitted to
    gateway: Arc<G>,
    /// Tracked user operations, shared with the submission tasks
    mempool: Mempool,
    /// Beneficiary address where the gas is refunded after execution
    beneficiary: Address,
    /// Chain id of the chain the bundler is running on
    chain_id: u64,
    /// Static gas estimation returned for every user operation
    gas_estimation: UserOperationGasEstimation,
    /// Maximum time a submission may take until the bundle transaction is confirmed
    confirmation_timeout: Duration,
}

impl<G: EntryPointGateway> Clone for Bundler<G> {
    fn clone(&self) -> Self {
        Self {
            gateway: self.gateway.clone(),
            mempool: self.mempool.clone(),
            beneficiary: self.beneficiary,
            chain_id: self.chain_id,
            gas_estimation: self.gas_estimation.clone(),
            confirmation_timeout: self.confirmation_timeout,
        }
    }
}

impl<G: EntryPointGateway> Bundler<G> {
    pub fn new(gateway: Arc<G>, mempool: Mempool, beneficiary: Address, chain_id: u64) -> Self {
        Self {
            gateway,
            mempool,
            beneficiary,
            chain_id,
            gas_estimation: UserOperationGasEstimation {
                pre_verification_gas: gas::PRE_VERIFICATION_GAS.into(),
                verification_gas_limit: gas::VERIFICATION_GAS_LIMIT.into(),
                call_gas_limit: gas::CALL_GAS_LIMIT.into(),
            },
            confirmation_timeout: Duration::from_secs(CONFIRMATION_TIMEOUT),
        }
    }

    pub fn with_gas_estimation(mut self, gas_estimation: UserOperationGasEstimation) -> Self {
        self.gas_estimation = gas_estimation;
        self
    }

    pub fn with_confirmation_timeout(mut self, confirmation_timeout: Duration) -> Self {
        self.confirmation_timeout = confirmation_timeout;
        self
    }

    pub fn entry_point(&self) -> Address {
        self.gateway.address()
    }

    pub fn beneficiary(&self) -> Address {
        self.beneficiary
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn mempool(&self) -> &Mempool {
        &self.mempool
    }

    pub fn supported_entry_points(&self) -> Vec<Address> {
        vec![self.gateway.address()]
    }

    fn validate_entry_point(&self, entry_point: &Address) -> Result<(), BundlerError> {
        if *entry_point != self.gateway.address() {
            return Err(BundlerError::UnsupportedEntryPoint { entry_point: *entry_point });
        }
        Ok(())
    }

    fn validate_user_operation(&self, uo: &UserOperation) -> Result<(), BundlerError> {
        if uo.sender.is_zero() {
            return Err(BundlerError::InvalidUserOperation {
                inner: "sender must not be the zero address".into(),
            });
        }
        if uo.signature.is_empty() {
            return Err(BundlerError::InvalidUserOperation {
                inner: "signature must not be empty".into(),
            });
        }
        Ok(())
    }

    /// Accepts the [UserOperation](UserOperation) and submits it in the background
    ///
    /// Returns as soon as the user operation is tracked as pending. Submitting a user operation
    /// that is already tracked returns its hash without submitting it again.
    pub async fn send_user_operation(
        &self,
        uo: UserOperation,
        entry_point: Address,
    ) -> Result<UserOperationHash, BundlerError> {
        self.validate_user_operation(&uo)?;
        self.validate_entry_point(&entry_point)?;

        let uo_hash = self.gateway.get_user_op_hash(&uo).await.map_err(BundlerError::Hash)?;

        let mut mempool = self.mempool.clone();
        if !mempool.insert(TrackedUserOperation::pending(uo_hash, uo.clone(), entry_point))? {
            debug!("User operation {uo_hash} is already tracked, not submitting it again");
            return Ok(uo_hash);
        }

        info!("Accepted user operation {uo_hash} from sender {:?}", uo.sender);
        trace!("User operation content: {uo:?}");

        self.submit(uo_hash, uo);

        Ok(uo_hash)
    }

    /// Spawns the task that submits the bundle and records its outcome
    fn submit(&self, uo_hash: UserOperationHash, uo: UserOperation) {
        let gateway = self.gateway.clone();
        let mut mempool = self.mempool.clone();
        let beneficiary = self.beneficiary;
        let confirmation_timeout = self.confirmation_timeout;

        tokio::spawn(async move {
            let resolution = match tokio::time::timeout(
                confirmation_timeout,
                gateway.handle_ops(vec![uo], beneficiary),
            )
            .await
            {
                Ok(Ok(outcome)) => resolve_outcome(&uo_hash, outcome),
                Ok(Err(err)) => Resolution::failed(err.to_string()),
                Err(_) => Resolution::failed(format!(
                    "bundle transaction not confirmed within {}s",
                    confirmation_timeout.as_secs_f64()
                )),
            };

            match &resolution {
                Resolution::Included(inclusion) => info!(
                    "User operation {uo_hash} included in transaction {:?}",
                    inclusion.transaction_hash
                ),
                Resolution::Failed { reason, .. } => {
                    warn!("User operation {uo_hash} failed: {reason}")
                }
            }

            if let Err(err) = mempool.resolve(&uo_hash, resolution) {
                warn!("Failed to record outcome of user operation {uo_hash}: {err}");
            }
        });
    }

    /// Static gas estimation (no simulation is performed)
    pub fn estimate_user_operation_gas(
        &self,
        _uo: &UserOperation,
        entry_point: &Address,
    ) -> Result<UserOperationGasEstimation, BundlerError> {
        self.validate_entry_point(entry_point)?;
        Ok(self.gas_estimation.clone())
    }

    /// Tracked user operation, `None` if the hash is unknown
    pub fn get_user_operation_by_hash(
        &self,
        uo_hash: &UserOperationHash,
    ) -> Result<Option<UserOperationByHash>, BundlerError> {
        Ok(self.mempool.get(uo_hash)?.map(|uo| uo.to_user_operation_by_hash()))
    }

    /// Receipt of the user operation, `None` if the hash is unknown or the user operation is
    /// still pending
    pub fn get_user_operation_receipt(
        &self,
        uo_hash: &UserOperationHash,
    ) -> Result<Option<UserOperationReceipt>, BundlerError> {
        Ok(self.mempool.get(uo_hash)?.and_then(|uo| uo.to_receipt()))
    }
}

fn resolve_outcome(uo_hash: &UserOperationHash, outcome: HandleOpsOutcome) -> Resolution {
    let uo_outcome = outcome.user_operation(&uo_hash.0);

    let inclusion = ChainInclusion {
        transaction_hash: outcome.transaction_hash,
        block_hash: outcome.block_hash,
        block_number: outcome.block_number,
        actual_gas_cost: uo_outcome.map(|o| o.actual_gas_cost).unwrap_or_default(),
        actual_gas_used: uo_outcome.map(|o| o.actual_gas_used).unwrap_or_default(),
    };

    if outcome.reverted {
        return Resolution::Failed {
            reason: "bundle transaction reverted".into(),
            inclusion: Some(inclusion),
        };
    }

    match uo_outcome {
        Some(o) if o.success => Resolution::Included(inclusion),
        Some(o) => Resolution::Failed {
            reason: o
                .revert_reason
                .clone()
                .unwrap_or_else(|| "user operation execution reverted".into()),
            inclusion: Some(inclusion),
        },
        None => Resolution::Failed {
            reason: "bundle transaction has no event for the user operation".into(),
            inclusion: Some(inclusion),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockEntryPoint;
    use ethers::types::{H256, U256, U64};
    use sluice_contracts::UserOperationOutcome;
    use sluice_primitives::{constants::entry_point, UserOperationStatus};

    const CHAIN_ID: u64 = 1337;

    fn entry_point_address() -> Address {
        entry_point::ADDRESS.parse().unwrap()
    }

    fn bundler(block_time: Duration) -> (Bundler<MockEntryPoint>, Arc<MockEntryPoint>) {
        let gateway = Arc::new(
            MockEntryPoint::new(entry_point_address(), CHAIN_ID).with_block_time(block_time),
        );
        let bundler =
            Bundler::new(gateway.clone(), Mempool::memory(), Address::repeat_byte(0xbe), CHAIN_ID);
        (bundler, gateway)
    }

    fn user_operation(sender: Address) -> UserOperation {
        UserOperation::default().sender(sender).call_data("0x".parse().unwrap()).signature(
            "0x7cb39607585dee8e297d0d7a669ad8c5e43975220b6773c10a138deadbc8ec864981de4b9b3c735288a217115fb33f8326a61ddabc60a534e3b5536515c70f931c".parse().unwrap(),
        )
    }

    async fn wait_until_resolved<G: EntryPointGateway>(
        bundler: &Bundler<G>,
        uo_hash: &UserOperationHash,
    ) -> UserOperationReceipt {
        for _ in 0..500 {
            if let Some(receipt) = bundler.get_user_operation_receipt(uo_hash).unwrap() {
                return receipt;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("user operation {uo_hash} was not resolved");
    }

    #[tokio::test]
    async fn send_user_operation_is_tracked_immediately() {
        let (bundler, _) = bundler(Duration::from_millis(200));
        let uo = user_operation(Address::repeat_byte(0xaa));

        let uo_hash = bundler.send_user_operation(uo.clone(), entry_point_address()).await.unwrap();

        let by_hash = bundler.get_user_operation_by_hash(&uo_hash).unwrap().unwrap();
        assert_eq!(by_hash.user_operation, uo);
        assert_eq!(by_hash.entry_point, entry_point_address());
        assert_eq!(by_hash.transaction_hash, None);
        assert_eq!(by_hash.block_number, None);
        assert_eq!(
            bundler.mempool().get(&uo_hash).unwrap().unwrap().status,
            UserOperationStatus::Pending
        );
    }

    #[tokio::test]
    async fn unknown_hash_is_absent() {
        let (bundler, _) = bundler(Duration::from_millis(10));
        let uo_hash = UserOperationHash(H256::repeat_byte(0x42));

        assert_eq!(bundler.get_user_operation_by_hash(&uo_hash).unwrap(), None);
        assert_eq!(bundler.get_user_operation_receipt(&uo_hash).unwrap(), None);
    }

    #[tokio::test]
    async fn hash_is_deterministic() {
        let (bundler, gateway) = bundler(Duration::from_millis(10));
        let uo = user_operation(Address::repeat_byte(0xaa));

        let first = gateway.get_user_op_hash(&uo).await.unwrap();
        let second = gateway.get_user_op_hash(&uo).await.unwrap();
        assert_eq!(first, second);

        let other = gateway.get_user_op_hash(&uo.clone().nonce(1.into())).await.unwrap();
        assert_ne!(first, other);

        let uo_hash = bundler.send_user_operation(uo, entry_point_address()).await.unwrap();
        assert_eq!(uo_hash, first);
    }

    #[tokio::test]
    async fn receipt_absent_while_pending_then_permanent() {
        let (bundler, _) = bundler(Duration::from_millis(200));
        let uo_hash = bundler
            .send_user_operation(user_operation(Address::repeat_byte(0xaa)), entry_point_address())
            .await
            .unwrap();

        assert_eq!(bundler.get_user_operation_receipt(&uo_hash).unwrap(), None);

        let receipt = wait_until_resolved(&bundler, &uo_hash).await;
        for _ in 0..3 {
            tokio::time::sleep(Duration::from_millis(20)).await;
            assert_eq!(bundler.get_user_operation_receipt(&uo_hash).unwrap(), Some(receipt.clone()));
        }
    }

    #[tokio::test]
    async fn unsupported_entry_point_leaves_mempool_unchanged() {
        let (bundler, gateway) = bundler(Duration::from_millis(10));

        let res = bundler
            .send_user_operation(
                user_operation(Address::repeat_byte(0xaa)),
                Address::repeat_byte(0x01),
            )
            .await;

        assert_eq!(
            res,
            Err(BundlerError::UnsupportedEntryPoint { entry_point: Address::repeat_byte(0x01) })
        );
        assert!(bundler.mempool().is_empty());
        assert_eq!(gateway.submissions(), 0);
    }

    #[tokio::test]
    async fn invalid_user_operation_is_rejected() {
        let (bundler, _) = bundler(Duration::from_millis(10));

        let res = bundler
            .send_user_operation(user_operation(Address::zero()), entry_point_address())
            .await;
        assert!(matches!(res, Err(BundlerError::InvalidUserOperation { .. })));

        let unsigned = user_operation(Address::repeat_byte(0xaa)).signature(Default::default());
        let res = bundler.send_user_operation(unsigned, entry_point_address()).await;
        assert!(matches!(res, Err(BundlerError::InvalidUserOperation { .. })));

        assert!(bundler.mempool().is_empty());
    }

    #[tokio::test]
    async fn hash_failure_stores_nothing() {
        let (bundler, gateway) = bundler(Duration::from_millis(10));
        let sender = Address::repeat_byte(0xaa);
        gateway.reject_hash_for(sender);

        let res = bundler.send_user_operation(user_operation(sender), entry_point_address()).await;

        assert!(matches!(res, Err(BundlerError::Hash(_))));
        assert!(bundler.mempool().is_empty());
        assert_eq!(gateway.submissions(), 0);
    }

    #[tokio::test]
    async fn included_user_operation_receipt() {
        let (bundler, _) = bundler(Duration::from_millis(20));
        let uo = user_operation(Address::repeat_byte(0xaa))
            .gas_fees(1_000_000_000.into(), 2_000_000_000_u64.into());

        let uo_hash = bundler.send_user_operation(uo.clone(), entry_point_address()).await.unwrap();
        let receipt = wait_until_resolved(&bundler, &uo_hash).await;

        assert!(receipt.success);
        assert_eq!(receipt.tx_receipt.status, U64::one());
        assert!(receipt.tx_receipt.transaction_hash.is_some());
        assert_eq!(receipt.sender, uo.sender);
        assert_eq!(receipt.actual_gas_used, 100_000.into());
        assert_eq!(receipt.actual_gas_cost, U256::from(100_000) * U256::from(2_000_000_000_u64));
        assert!(receipt.logs.is_empty());

        let by_hash = bundler.get_user_operation_by_hash(&uo_hash).unwrap().unwrap();
        assert_eq!(by_hash.transaction_hash, receipt.tx_receipt.transaction_hash);
        assert!(by_hash.block_number.is_some());
    }

    #[tokio::test]
    async fn reverted_user_operation_receipt() {
        let (bundler, gateway) = bundler(Duration::from_millis(20));
        let sender = Address::repeat_byte(0xaa);
        gateway.revert_for(sender);

        let uo_hash =
            bundler.send_user_operation(user_operation(sender), entry_point_address()).await.unwrap();
        let receipt = wait_until_resolved(&bundler, &uo_hash).await;

        assert!(!receipt.success);
        assert_eq!(receipt.tx_receipt.status, U64::zero());
        assert_eq!(receipt.reason, "execution reverted");
        assert_eq!(
            bundler.mempool().get(&uo_hash).unwrap().unwrap().status,
            UserOperationStatus::Failed
        );
    }

    #[tokio::test]
    async fn concurrent_user_operations_resolve_independently() {
        let (bundler, gateway) = bundler(Duration::from_millis(50));
        let (alice, bob) = (Address::repeat_byte(0xaa), Address::repeat_byte(0xbb));
        gateway.revert_for(bob);

        let (alice_hash, bob_hash) = tokio::join!(
            bundler.send_user_operation(user_operation(alice), entry_point_address()),
            bundler.send_user_operation(user_operation(bob), entry_point_address()),
        );
        let (alice_hash, bob_hash) = (alice_hash.unwrap(), bob_hash.unwrap());
        assert_ne!(alice_hash, bob_hash);

        let alice_receipt = wait_until_resolved(&bundler, &alice_hash).await;
        let bob_receipt = wait_until_resolved(&bundler, &bob_hash).await;

        assert!(alice_receipt.success);
        assert!(!bob_receipt.success);
        assert_eq!(gateway.submissions(), 2);
    }

    #[tokio::test]
    async fn duplicate_submission_is_submitted_once() {
        let (bundler, gateway) = bundler(Duration::from_millis(50));
        let uo = user_operation(Address::repeat_byte(0xaa));

        let first = bundler.send_user_operation(uo.clone(), entry_point_address()).await.unwrap();
        let second = bundler.send_user_operation(uo.clone(), entry_point_address()).await.unwrap();
        assert_eq!(first, second);

        wait_until_resolved(&bundler, &first).await;
        let third = bundler.send_user_operation(uo, entry_point_address()).await.unwrap();
        assert_eq!(first, third);

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(gateway.submissions(), 1);
        assert_eq!(bundler.mempool().len(), 1);
    }

    #[tokio::test]
    async fn confirmation_timeout_marks_failed() {
        let (bundler, gateway) = bundler(Duration::from_millis(10));
        let bundler = bundler.with_confirmation_timeout(Duration::from_millis(50));
        gateway.stall();

        let uo_hash = bundler
            .send_user_operation(user_operation(Address::repeat_byte(0xaa)), entry_point_address())
            .await
            .unwrap();
        let receipt = wait_until_resolved(&bundler, &uo_hash).await;

        assert!(!receipt.success);
        assert!(receipt.reason.contains("not confirmed"));
        assert_eq!(receipt.tx_receipt.transaction_hash, None);
    }

    #[tokio::test]
    async fn static_gas_estimation() {
        let (bundler, _) = bundler(Duration::from_millis(10));
        let uo = user_operation(Address::repeat_byte(0xaa));

        let estimation = bundler.estimate_user_operation_gas(&uo, &entry_point_address()).unwrap();
        assert_eq!(estimation.pre_verification_gas, 0x186a0.into());
        assert_eq!(estimation.verification_gas_limit, 0x186a0.into());
        assert_eq!(estimation.call_gas_limit, 0x186a0.into());

        assert!(bundler.estimate_user_operation_gas(&uo, &Address::repeat_byte(0x01)).is_err());
        assert_eq!(bundler.supported_entry_points(), vec![entry_point_address()]);
    }

    #[test]
    fn reverted_bundle_fails_user_operation() {
        let uo_hash = UserOperationHash(H256::repeat_byte(0x01));
        let outcome = HandleOpsOutcome {
            transaction_hash: H256::repeat_byte(0x02),
            block_hash: None,
            block_number: Some(5.into()),
            gas_used: None,
            reverted: true,
            user_operations: vec![],
        };

        match resolve_outcome(&uo_hash, outcome) {
            Resolution::Failed { reason, inclusion } => {
                assert_eq!(reason, "bundle transaction reverted");
                assert_eq!(inclusion.unwrap().actual_gas_used, U256::zero());
            }
            other => panic!("unexpected resolution {other:?}"),
        }
    }

    #[test]
    fn missing_event_fails_user_operation() {
        let uo_hash = UserOperationHash(H256::repeat_byte(0x01));
        let outcome = HandleOpsOutcome {
            transaction_hash: H256::repeat_byte(0x02),
            block_hash: None,
            block_number: None,
            gas_used: None,
            reverted: false,
            user_operations: vec![UserOperationOutcome {
                user_op_hash: H256::repeat_byte(0x03),
                sender: Address::zero(),
                paymaster: Address::zero(),
                nonce: U256::zero(),
                success: true,
                actual_gas_cost: U256::zero(),
                actual_gas_used: U256::zero(),
                revert_reason: None,
            }],
        };

        assert!(matches!(resolve_outcome(&uo_hash, outcome), Resolution::Failed { .. }));
    }
}
