//! JSON-RPC interface of the bundler

mod error;
mod eth;
mod eth_api;
mod health;
mod health_api;
mod rpc;

pub use error::JsonRpcError;
pub use eth::EthApiServerImpl;
pub use eth_api::EthApiServer;
pub use health::HealthApiServerImpl;
pub use health_api::{Health, HealthApiClient, HealthApiServer};
pub use rpc::JsonRpcServer;
