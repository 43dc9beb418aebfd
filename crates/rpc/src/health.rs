use crate::health_api::{Health, HealthApiServer};
use async_trait::async_trait;
use ethers::types::Address;
use jsonrpsee::core::RpcResult;
use sluice_primitives::constants::bundler::NAME;

/// HealthApiServer reports a static health for as long as the server is able to answer
pub struct HealthApiServerImpl {
    pub entry_point: Address,
}

#[async_trait]
impl HealthApiServer for HealthApiServerImpl {
    async fn health(&self) -> RpcResult<Health> {
        Ok(Health { status: "ok".into(), bundler: NAME.into(), entry_point: self.entry_point })
    }
}
