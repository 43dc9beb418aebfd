use ethers::types::{Address, Bytes, U64};
use jsonrpsee::{
    core::{client::Error as RpcError, RpcResult},
    http_client::{HttpClient, HttpClientBuilder},
    proc_macros::rpc,
    server::ServerHandle,
};
use sluice_bundler::{Bundler, MockEntryPoint};
use sluice_mempool::Mempool;
use sluice_primitives::{
    constants::entry_point, UserOperation, UserOperationByHash, UserOperationGasEstimation,
    UserOperationHash, UserOperationPartial, UserOperationReceipt,
};
use sluice_rpc::{
    EthApiServer, EthApiServerImpl, HealthApiServer, HealthApiServerImpl, JsonRpcServer,
};
use std::{net::SocketAddr, sync::Arc, time::Duration};

pub const CHAIN_ID: u64 = 1337;

/// Typed client for the `eth` namespace served by [EthApiServerImpl](EthApiServerImpl)
#[rpc(client, namespace = "eth")]
pub trait TypedEthApi {
    #[method(name = "chainId")]
    async fn chain_id(&self) -> RpcResult<U64>;

    #[method(name = "supportedEntryPoints")]
    async fn supported_entry_points(&self) -> RpcResult<Vec<String>>;

    #[method(name = "sendUserOperation")]
    async fn send_user_operation(
        &self,
        user_operation: UserOperation,
        entry_point: Address,
    ) -> RpcResult<UserOperationHash>;

    #[method(name = "estimateUserOperationGas")]
    async fn estimate_user_operation_gas(
        &self,
        user_operation: UserOperationPartial,
        entry_point: Address,
    ) -> RpcResult<UserOperationGasEstimation>;

    #[method(name = "getUserOperationReceipt")]
    async fn get_user_operation_receipt(
        &self,
        user_operation_hash: String,
    ) -> RpcResult<Option<UserOperationReceipt>>;

    #[method(name = "getUserOperationByHash")]
    async fn get_user_operation_by_hash(
        &self,
        user_operation_hash: String,
    ) -> RpcResult<Option<UserOperationByHash>>;
}

pub fn entry_point_address() -> Address {
    entry_point::ADDRESS.parse().unwrap()
}

pub fn user_operation(sender: Address) -> UserOperation {
    UserOperation::default()
        .sender(sender)
        .call_data(Bytes::from(vec![0xb6, 0x1d, 0x27, 0xf6]))
        .account_gas_limits(100_000.into(), 100_000.into())
        .pre_verification_gas(100_000.into())
        .gas_fees(1_000_000_000.into(), 2_000_000_000_u64.into())
        .signature(vec![0x1b; 65].into())
}

/// Bundler RPC server backed by a [MockEntryPoint](MockEntryPoint), listening on a free port
pub struct TestServer {
    pub addr: SocketAddr,
    pub entry_point: Arc<MockEntryPoint>,
    _handle: ServerHandle,
}

impl TestServer {
    pub async fn start(block_time: Duration) -> TestServer {
        let entry_point = Arc::new(
            MockEntryPoint::new(entry_point_address(), CHAIN_ID).with_block_time(block_time),
        );
        let bundler =
            Bundler::new(entry_point.clone(), Mempool::memory(), Address::repeat_byte(0xbe), CHAIN_ID);

        let mut server = JsonRpcServer::new("127.0.0.1:0".to_string()).with_cors(vec!["*".into()]);
        server.add_methods(EthApiServerImpl::new(bundler).into_rpc()).unwrap();
        server
            .add_methods(HealthApiServerImpl { entry_point: entry_point_address() }.into_rpc())
            .unwrap();

        let (addr, handle) = server.start().await.unwrap();
        TestServer { addr, entry_point, _handle: handle }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    pub fn client(&self) -> HttpClient {
        build_http_client(self.addr).unwrap()
    }
}

pub fn build_http_client(address: SocketAddr) -> Result<HttpClient, RpcError> {
    HttpClientBuilder::default().build(format!("http://{}", address))
}
