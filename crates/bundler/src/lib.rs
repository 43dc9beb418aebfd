//! Bundler is a crate for accepting user operations, submitting them to the entry point and
//! tracking them until their bundle transaction is confirmed

mod bundler;
mod errors;
mod ethereum;
mod gateway;
#[cfg(any(test, feature = "test-utils"))]
mod mock;

pub use bundler::Bundler;
pub use errors::BundlerError;
pub use ethereum::{signing_entry_point, SignerClient};
pub use gateway::EntryPointGateway;
#[cfg(any(test, feature = "test-utils"))]
pub use mock::MockEntryPoint;
