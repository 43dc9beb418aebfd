use crate::{
    deployment::DeploymentRecord,
    utils::{parse_address, parse_duration, parse_u256},
};
use clap::Parser;
use ethers::types::{Address, U256};
use sluice_primitives::{
    constants::{
        bundler::{CONFIRMATIONS, RECEIPT_POLL_INTERVAL},
        entry_point,
        gas,
        networking::DEFAULT_HTTP_RPC_PORT,
    },
    UserOperationGasEstimation,
};
use std::{
    net::{IpAddr, Ipv4Addr},
    path::PathBuf,
    time::Duration,
};
use tracing::info;

/// Bundler CLI args
#[derive(Debug, Clone, Parser, PartialEq)]
pub struct BundlerArgs {
    /// Private key of the bundler's operating account.
    #[clap(long, env = "SLUICE_PRIVATE_KEY", hide_env_values = true)]
    pub private_key: Option<String>,

    /// Path to the mnemonic file.
    ///
    /// Ignored when a private key is given (flag or `SLUICE_PRIVATE_KEY`).
    #[clap(long)]
    pub mnemonic_file: Option<PathBuf>,

    /// The bundler beneficiary address.
    ///
    /// By default, the gas is refunded to the bundler's operating account.
    #[clap(long, value_parser=parse_address)]
    pub beneficiary: Option<Address>,

    /// Time (in seconds) to wait for a bundle transaction to be confirmed.
    ///
    /// By default, this option is set to `120`.
    #[clap(long, default_value = "120", value_parser=parse_duration)]
    pub confirmation_timeout: Duration,

    /// Number of confirmations before a bundle transaction is considered included.
    #[clap(long, default_value_t = CONFIRMATIONS)]
    pub confirmations: usize,

    /// Interval (in milliseconds) for polling the bundle transaction receipt.
    #[clap(long, default_value_t = RECEIPT_POLL_INTERVAL)]
    pub receipt_poll_interval: u64,
}

/// Common CLI args
#[derive(Debug, Clone, Parser, PartialEq)]
pub struct CommonArgs {
    /// Ethereum execution client RPC endpoint.
    #[clap(long, env = "ETH_CLIENT_ADDRESS", default_value = "http://127.0.0.1:8545")]
    pub eth_client_address: String,

    /// Chain information.
    #[clap(long)]
    pub chain: Option<String>,

    /// Entry point address.
    #[clap(long, value_parser=parse_address)]
    pub entry_point: Option<Address>,

    /// Deployment record supplying the entry point address (`contracts.EntryPoint`).
    #[clap(long)]
    pub deployment: Option<PathBuf>,
}

impl CommonArgs {
    /// Entry point the bundler submits to: the `--entry-point` flag, the deployment record or the
    /// canonical v0.7 deployment, in this order.
    ///
    /// A deployment record made for another chain than `chain_id` is rejected.
    pub fn resolve_entry_point(&self, chain_id: u64) -> eyre::Result<Address> {
        if let Some(entry_point) = self.entry_point {
            return Ok(entry_point);
        }

        if let Some(path) = &self.deployment {
            let record = DeploymentRecord::load(&path.clone().into())?;
            let record_chain_id = record.chain_id()?;
            if record_chain_id != chain_id {
                return Err(eyre::format_err!(
                    "Deployment record of network {} is for chain {}, connected to chain {}",
                    record.network,
                    record_chain_id,
                    chain_id
                ));
            }
            info!(
                "Using entry point {:?} from deployment record of network {}",
                record.contracts.entry_point, record.network
            );
            return Ok(record.contracts.entry_point);
        }

        Ok(entry_point::ADDRESS.parse()?)
    }
}

/// RPC CLI args
#[derive(Debug, Clone, Parser, PartialEq)]
pub struct RpcArgs {
    /// Sets the HTTP RPC address to listen on.
    ///
    /// By default, this option is set to `127.0.0.1`
    #[clap(long = "http.addr", default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST))]
    pub http_addr: IpAddr,

    /// Sets the HTTP RPC port to listen on.
    ///
    /// By default, this option is set to `4337`
    #[clap(long = "http.port", env = "PORT", default_value_t = DEFAULT_HTTP_RPC_PORT)]
    pub http_port: u16,

    /// Configures the allowed CORS domains.
    ///
    /// By default, this option is set to `*`.
    #[clap(long = "http.corsdomain", value_delimiter = ',', default_value = "*")]
    pub http_corsdomain: Vec<String>,
}

impl RpcArgs {
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.http_addr, self.http_port)
    }
}

/// Static gas estimation CLI args
#[derive(Debug, Clone, Parser, PartialEq)]
pub struct GasArgs {
    /// Pre-verification gas returned by `eth_estimateUserOperationGas`.
    #[clap(long, default_value_t = gas::PRE_VERIFICATION_GAS.into(), value_parser=parse_u256)]
    pub pre_verification_gas: U256,

    /// Verification gas limit returned by `eth_estimateUserOperationGas`.
    #[clap(long, default_value_t = gas::VERIFICATION_GAS_LIMIT.into(), value_parser=parse_u256)]
    pub verification_gas_limit: U256,

    /// Call gas limit returned by `eth_estimateUserOperationGas`.
    #[clap(long, default_value_t = gas::CALL_GAS_LIMIT.into(), value_parser=parse_u256)]
    pub call_gas_limit: U256,
}

impl GasArgs {
    pub fn gas_estimation(&self) -> UserOperationGasEstimation {
        UserOperationGasEstimation {
            pre_verification_gas: self.pre_verification_gas,
            verification_gas_limit: self.verification_gas_limit,
            call_gas_limit: self.call_gas_limit,
        }
    }
}
