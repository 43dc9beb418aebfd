use crate::cli::args::{BundlerArgs, CommonArgs, GasArgs, RpcArgs};
use alloy_chains::Chain;
use ethers::providers::Middleware;
use jsonrpsee::server::ServerHandle;
use sluice_bundler::{signing_entry_point, Bundler};
use sluice_mempool::Mempool;
use sluice_primitives::Wallet;
use sluice_rpc::{
    EthApiServer, EthApiServerImpl, HealthApiServer, HealthApiServerImpl, JsonRpcServer,
};
use std::{sync::Arc, time::Duration};
use tracing::info;

/// Starts the bundler (entry point gateway, operation store, bundler engine) and its JSON-RPC
/// server
///
/// # Returns
/// * `eyre::Result<ServerHandle>` - The [handle](ServerHandle) of the JSON-RPC server.
pub async fn launch_bundler<M>(
    bundler_args: BundlerArgs,
    common_args: CommonArgs,
    rpc_args: RpcArgs,
    gas_args: GasArgs,
    eth_client: Arc<M>,
) -> eyre::Result<ServerHandle>
where
    M: Middleware + 'static,
{
    let (chain, eth_client_version) =
        check_connected_chain(eth_client.clone(), common_args.chain.clone()).await?;
    info!("Connected to Ethereum execution client {eth_client_version} on chain {chain}");

    let entry_point = common_args.resolve_entry_point(chain.id())?;
    let wallet = load_wallet(&bundler_args, chain.id())?;
    let beneficiary = bundler_args.beneficiary.unwrap_or_else(|| wallet.address());
    info!("Bundler operating account {:?}, beneficiary {beneficiary:?}", wallet.address());

    let gateway = signing_entry_point(eth_client, wallet, entry_point)
        .with_confirmations(bundler_args.confirmations)
        .with_poll_interval(Duration::from_millis(bundler_args.receipt_poll_interval));

    let bundler = Bundler::new(Arc::new(gateway), Mempool::memory(), beneficiary, chain.id())
        .with_gas_estimation(gas_args.gas_estimation())
        .with_confirmation_timeout(bundler_args.confirmation_timeout);
    info!("Bundler submitting to entry point {entry_point:?}");

    let mut server =
        JsonRpcServer::new(rpc_args.listen_address()).with_cors(rpc_args.http_corsdomain.clone());
    server.add_methods(EthApiServerImpl::new(bundler).into_rpc())?;
    server.add_methods(HealthApiServerImpl { entry_point }.into_rpc())?;

    let (addr, handle) = server.start().await?;
    info!("Started bundler JSON-RPC server at {addr}");

    Ok(handle)
}

/// Operating account from the private key, or from the mnemonic file when no private key is set
fn load_wallet(args: &BundlerArgs, chain_id: u64) -> eyre::Result<Wallet> {
    if let Some(private_key) = &args.private_key {
        return Wallet::from_private_key(private_key, chain_id)
            .map_err(|error| eyre::format_err!("Could not load private key: {}", error));
    }

    if let Some(mnemonic_file) = &args.mnemonic_file {
        return Wallet::from_file(mnemonic_file.clone().into(), chain_id)
            .map_err(|error| eyre::format_err!("Could not load mnemonic file: {}", error));
    }

    Err(eyre::format_err!(
        "Bundler operating account is missing: set SLUICE_PRIVATE_KEY, --private-key or --mnemonic-file"
    ))
}

async fn check_connected_chain<M>(
    eth_client: Arc<M>,
    chain: Option<String>,
) -> eyre::Result<(Chain, String)>
where
    M: Middleware + 'static,
{
    let chain_id = eth_client.get_chainid().await?;
    let chain_conn = Chain::from_id(chain_id.as_u64());

    if let Some(chain_opt) = chain {
        if chain_conn.to_string() != chain_opt && chain_id.to_string() != chain_opt {
            return Err(eyre::format_err!(
                "Tried to connect to the execution client of different chain: {} != {}",
                chain_opt,
                chain_conn
            ));
        }
    }

    let eth_client_version = eth_client.client_version().await?;

    Ok((chain_conn, eth_client_version))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn wallet_from_private_key_or_mnemonic_file() {
        let args = BundlerArgs::try_parse_from(vec![
            "bundlerargs",
            "--private-key",
            "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
        ])
        .unwrap();
        let wallet = load_wallet(&args, 31337).unwrap();
        assert_eq!(
            wallet.address(),
            "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266".parse().unwrap()
        );

        let mut args = args;
        args.private_key = None;
        assert!(load_wallet(&args, 31337).is_err());
    }

    #[test]
    fn private_key_wins_over_mnemonic_file() {
        let args = BundlerArgs::try_parse_from(vec![
            "bundlerargs",
            "--private-key",
            "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
            "--mnemonic-file",
            "/nonexistent/sluice/mnemonic",
        ])
        .unwrap();
        let wallet = load_wallet(&args, 31337).unwrap();
        assert_eq!(
            wallet.address(),
            "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266".parse().unwrap()
        );
    }
}
