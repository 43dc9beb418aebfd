use super::args::{BundlerArgs, CommonArgs, GasArgs, RpcArgs};
use crate::bundler::launch_bundler;
use clap::Parser;
use ethers::providers::{Http, Provider};
use std::{sync::Arc, time::Duration};

/// Start the bundler with all components (bundler engine, user operation store, RPC server)
#[derive(Debug, Parser)]
pub struct NodeCommand {
    /// All Bundler specific args
    #[clap(flatten)]
    bundler: BundlerArgs,

    /// Common args
    #[clap(flatten)]
    common: CommonArgs,

    /// All RPC args
    #[clap(flatten)]
    rpc: RpcArgs,

    /// Static gas estimation args
    #[clap(flatten)]
    gas: GasArgs,
}

impl NodeCommand {
    /// Execute the command
    pub async fn execute(self) -> eyre::Result<()> {
        let eth_client = Provider::<Http>::try_from(self.common.eth_client_address.as_str())?
            .interval(Duration::from_millis(self.bundler.receipt_poll_interval));

        let handle =
            launch_bundler(self.bundler, self.common, self.rpc, self.gas, Arc::new(eth_client))
                .await?;

        handle.stopped().await;

        Err(eyre::format_err!("Bundler JSON-RPC server stopped unexpectedly"))
    }
}
