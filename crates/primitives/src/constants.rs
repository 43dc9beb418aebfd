//! Account abstraction (ERC-4337)-related constants

/// Entry point smart contract
pub mod entry_point {
    /// Address of the entry point smart contract
    pub const ADDRESS: &str = "0x0000000071727De22E5E9d8BAf0edAc6f37da032";
}

/// Bundler
pub mod bundler {
    /// Name reported by the health endpoint
    pub const NAME: &str = "sluice";
    /// Default time to wait for a bundle transaction to be confirmed (in seconds)
    pub const CONFIRMATION_TIMEOUT: u64 = 120;
    /// Default number of confirmations before a bundle is considered included
    pub const CONFIRMATIONS: usize = 1;
    /// Default interval for polling the bundle transaction receipt (in milliseconds)
    pub const RECEIPT_POLL_INTERVAL: u64 = 1000;
}

/// Static gas estimation returned by `eth_estimateUserOperationGas`
pub mod gas {
    pub const PRE_VERIFICATION_GAS: u64 = 100_000;
    pub const VERIFICATION_GAS_LIMIT: u64 = 100_000;
    pub const CALL_GAS_LIMIT: u64 = 100_000;
}

/// Networking
pub mod networking {
    /// Default HTTP RPC port
    pub const DEFAULT_HTTP_RPC_PORT: u16 = 4337;
    /// Path of the health endpoint
    pub const HEALTH_PATH: &str = "/health";
}
