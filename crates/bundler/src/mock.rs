//! Entry point stand-in with a simulated block time, used to exercise the bundler without a chain

use crate::gateway::EntryPointGateway;
use ethers::{
    abi::{encode, Token},
    types::{Address, H256, U256},
    utils::keccak256,
};
use parking_lot::RwLock;
use sluice_contracts::{EntryPointError, HandleOpsOutcome, UserOperationOutcome};
use sluice_primitives::{UserOperation, UserOperationHash};
use std::{
    collections::HashSet,
    sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering},
    time::Duration,
};

const GAS_USED: u64 = 100_000;

#[derive(Debug)]
pub struct MockEntryPoint {
    address: Address,
    chain_id: u64,
    block_time: Duration,
    reverting_senders: RwLock<HashSet<Address>>,
    unhashable_senders: RwLock<HashSet<Address>>,
    stalled: AtomicBool,
    submissions: AtomicUsize,
    block_number: AtomicU64,
}

impl MockEntryPoint {
    pub fn new(address: Address, chain_id: u64) -> Self {
        Self {
            address,
            chain_id,
            block_time: Duration::from_millis(100),
            reverting_senders: Default::default(),
            unhashable_senders: Default::default(),
            stalled: AtomicBool::new(false),
            submissions: AtomicUsize::new(0),
            block_number: AtomicU64::new(0),
        }
    }

    /// Time between the submission and the confirmation of a bundle
    pub fn with_block_time(mut self, block_time: Duration) -> Self {
        self.block_time = block_time;
        self
    }

    /// Execution of the user operations of this sender reverts on chain
    pub fn revert_for(&self, sender: Address) {
        self.reverting_senders.write().insert(sender);
    }

    /// `getUserOpHash` fails for the user operations of this sender
    pub fn reject_hash_for(&self, sender: Address) {
        self.unhashable_senders.write().insert(sender);
    }

    /// Bundle transactions are never confirmed
    pub fn stall(&self) {
        self.stalled.store(true, Ordering::SeqCst);
    }

    /// Number of `handleOps` calls received so far
    pub fn submissions(&self) -> usize {
        self.submissions.load(Ordering::SeqCst)
    }

    fn hash(&self, uo: &UserOperation) -> H256 {
        H256(keccak256(encode(&[
            Token::Bytes(uo.pack().to_vec()),
            Token::Address(self.address),
            Token::Uint(self.chain_id.into()),
        ])))
    }
}

#[async_trait::async_trait]
impl EntryPointGateway for MockEntryPoint {
    fn address(&self) -> Address {
        self.address
    }

    async fn get_user_op_hash(
        &self,
        uo: &UserOperation,
    ) -> Result<UserOperationHash, EntryPointError> {
        if self.unhashable_senders.read().contains(&uo.sender) {
            return Err(EntryPointError::Provider { inner: "connection refused".into() });
        }
        Ok(self.hash(uo).into())
    }

    async fn handle_ops(
        &self,
        uos: Vec<UserOperation>,
        _beneficiary: Address,
    ) -> Result<HandleOpsOutcome, EntryPointError> {
        self.submissions.fetch_add(1, Ordering::SeqCst);

        if self.stalled.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        tokio::time::sleep(self.block_time).await;

        let block_number = self.block_number.fetch_add(1, Ordering::SeqCst) + 1;
        let hashes: Vec<H256> = uos.iter().map(|uo| self.hash(uo)).collect();
        let seed = hashes.first().copied().unwrap_or_default();

        let user_operations = uos
            .iter()
            .zip(hashes)
            .map(|(uo, user_op_hash)| {
                let success = !self.reverting_senders.read().contains(&uo.sender);
                UserOperationOutcome {
                    user_op_hash,
                    sender: uo.sender,
                    paymaster: uo.paymaster().unwrap_or_default(),
                    nonce: uo.nonce,
                    success,
                    actual_gas_cost: U256::from(GAS_USED) * uo.max_fee_per_gas(),
                    actual_gas_used: GAS_USED.into(),
                    revert_reason: (!success).then(|| "execution reverted".to_string()),
                }
            })
            .collect::<Vec<_>>();

        Ok(HandleOpsOutcome {
            transaction_hash: H256(keccak256(format!("tx-{seed:?}"))),
            block_hash: Some(H256(keccak256(block_number.to_be_bytes()))),
            block_number: Some(block_number.into()),
            gas_used: Some(U256::from(GAS_USED * user_operations.len() as u64)),
            reverted: false,
            user_operations,
        })
    }
}
