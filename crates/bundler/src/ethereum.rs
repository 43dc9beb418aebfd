use crate::gateway::EntryPointGateway;
use ethers::{
    middleware::SignerMiddleware, providers::Middleware, signers::LocalWallet, types::Address,
};
use sluice_contracts::{EntryPoint, EntryPointError, HandleOpsOutcome};
use sluice_primitives::{UserOperation, UserOperationHash, Wallet};
use std::sync::Arc;
use tracing::trace;

/// Ethereum execution client that signs the bundle transactions with the bundler's wallet
pub type SignerClient<M> = SignerMiddleware<Arc<M>, LocalWallet>;

/// Creates the entry point that sends the bundle transactions from the bundler's wallet
///
/// # Arguments
/// * `eth_client` - Connection to the Ethereum execution client
/// * `wallet` - A [Wallet](Wallet) instance
/// * `address` - Address of the entry point contract
pub fn signing_entry_point<M: Middleware + 'static>(
    eth_client: Arc<M>,
    wallet: Wallet,
    address: Address,
) -> EntryPoint<SignerClient<M>> {
    let signer = SignerMiddleware::new(eth_client, wallet.signer);
    EntryPoint::new(Arc::new(signer), address)
}

#[async_trait::async_trait]
impl<M> EntryPointGateway for EntryPoint<M>
where
    M: Middleware + 'static,
{
    fn address(&self) -> Address {
        EntryPoint::address(self)
    }

    async fn get_user_op_hash(
        &self,
        uo: &UserOperation,
    ) -> Result<UserOperationHash, EntryPointError> {
        let hash = EntryPoint::get_user_op_hash(self, uo.clone()).await?;
        Ok(hash.into())
    }

    async fn handle_ops(
        &self,
        uos: Vec<UserOperation>,
        beneficiary: Address,
    ) -> Result<HandleOpsOutcome, EntryPointError> {
        trace!("Sending handleOps transaction to the execution client: {uos:?}");

        let outcome = EntryPoint::handle_ops(self, uos, beneficiary).await?;

        trace!("handleOps outcome: {outcome:?}");

        Ok(outcome)
    }
}
