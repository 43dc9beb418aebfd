//! A `Wallet` is a wrapper around an ethers wallet that signs the bundle transactions
use ethers::{
    prelude::k256::ecdsa::SigningKey,
    signers::{coins_bip39::English, LocalWallet, MnemonicBuilder, Signer},
    types::Address,
};
use expanded_pathbuf::ExpandedPathBuf;

const DERIVATION_PATH: &str = "m/44'/60'/0'/0/0";

/// Wrapper around ethers wallet
#[derive(Clone, Debug)]
pub struct Wallet {
    /// Signing key of the wallet
    pub signer: ethers::signers::Wallet<SigningKey>,
}

impl Wallet {
    /// Create a new wallet from a hex encoded private key (with or without the `0x` prefix)
    ///
    /// # Arguments
    /// * `private_key` - The private key of the bundler's operating account
    /// * `chain_id` - The chain id of the blockchain network to be used
    pub fn from_private_key(private_key: &str, chain_id: u64) -> eyre::Result<Self> {
        let wallet: LocalWallet = private_key.trim().trim_start_matches("0x").parse()?;
        Ok(Self { signer: wallet.with_chain_id(chain_id) })
    }

    /// Create a new wallet from the given file containing the mnemonic phrase
    ///
    /// # Arguments
    /// * `path` - The path to the file where the mnemonic phrase is stored
    /// * `chain_id` - The chain id of the blockchain network to be used
    pub fn from_file(path: ExpandedPathBuf, chain_id: u64) -> eyre::Result<Self> {
        let wallet = MnemonicBuilder::<English>::default()
            .phrase(path.to_path_buf())
            .derivation_path(DERIVATION_PATH)?
            .build()?;
        Ok(Self { signer: wallet.with_chain_id(chain_id) })
    }

    /// Create a new wallet from the given mnemonic phrase
    ///
    /// # Arguments
    /// * `phrase` - The mnemonic phrase
    /// * `chain_id` - The chain id of the blockchain network to be used
    pub fn from_phrase(phrase: &str, chain_id: u64) -> eyre::Result<Self> {
        let wallet = MnemonicBuilder::<English>::default()
            .phrase(phrase)
            .derivation_path(DERIVATION_PATH)?
            .build()?;
        Ok(Self { signer: wallet.with_chain_id(chain_id) })
    }

    /// Address of the operating account (default beneficiary of the bundles)
    pub fn address(&self) -> Address {
        self.signer.address()
    }
}
