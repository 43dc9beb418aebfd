use crate::gen::EntryPointAPIErrors;
use ethers::{
    abi::AbiDecode,
    providers::{JsonRpcError, Middleware, MiddlewareError, ProviderError},
    types::{Bytes, H256, U256},
};
use lazy_static::lazy_static;
use regex::Regex;
use std::str::FromStr;
use thiserror::Error;

lazy_static! {
    static ref HEX_DATA: Regex = Regex::new(r"0x[0-9a-fA-F]+").expect("Regex rules valid");
}

/// Entry point errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EntryPointError {
    /// The entry point rejected a user operation of the bundle (`FailedOp`/`FailedOpWithRevert`)
    #[error("user operation {index} failed: {reason}")]
    FailedOp {
        /// Index of the user operation in the bundle
        index: U256,
        /// Reason reported by the entry point (e.g. `AA23 reverted`)
        reason: String,
    },

    /// execution reverted
    #[error("execution reverted: {0}")]
    ExecutionReverted(String),

    /// The bundle transaction was dropped from the mempool before being mined
    #[error("transaction {tx_hash:?} dropped from mempool")]
    Dropped {
        /// Hash of the dropped transaction
        tx_hash: H256,
    },

    /// Provider error
    #[error("provider error: {inner}")]
    Provider {
        /// The inner error message
        inner: String,
    },

    /// ABI error
    #[error("abi error: {inner}")]
    ABI {
        /// The inner error message
        inner: String,
    },

    /// Data decoding error
    #[error("decode error: {inner}")]
    Decode {
        /// The inner error message
        inner: String,
    },

    /// Any other error
    #[error("other error: {inner}")]
    Other {
        /// The inner error message
        inner: String,
    },
}

impl EntryPointError {
    pub fn from_provider_error(err: &ProviderError) -> Result<EntryPointAPIErrors, Self> {
        match err {
            ProviderError::JsonRpcClientError(err) => err
                .as_error_response()
                .map(Self::from_json_rpc_error)
                .unwrap_or(Err(EntryPointError::Provider {
                    inner: format!("unknown json-rpc client error: {err:?}"),
                })),
            ProviderError::HTTPError(err) => {
                Err(EntryPointError::Provider { inner: format!("HTTP error: {err:?}") })
            }
            _ => {
                Err(EntryPointError::Provider { inner: format!("unknown provider error: {err:?}") })
            }
        }
    }

    pub fn from_json_rpc_error(err: &JsonRpcError) -> Result<EntryPointAPIErrors, Self> {
        match err.data {
            Some(serde_json::Value::String(ref data)) => {
                let hex = HEX_DATA.find(data).ok_or_else(|| EntryPointError::Decode {
                    inner: format!("hex string not found in {data:?}"),
                })?;

                let bytes = Bytes::from_str(hex.as_str()).map_err(|e| EntryPointError::Decode {
                    inner: format!("string {data:?} could not be converted to bytes: {e:?}"),
                })?;

                decode_revert_error(bytes)
            }
            Some(ref other) => Err(Self::Decode {
                inner: format!("json-rpc return data is not a string: {other:?}"),
            }),
            // nodes reporting a plain `execution reverted` carry no revert data
            None if err.message.contains("revert") => {
                Err(Self::ExecutionReverted(err.message.clone()))
            }
            None => Err(Self::Provider {
                inner: format!("json-rpc error doesn't contain data field: {err:?}"),
            }),
        }
    }

    pub fn from_middleware_error<M: Middleware>(
        err: M::Error,
    ) -> Result<EntryPointAPIErrors, Self> {
        if let Some(err) = err.as_error_response() {
            return Self::from_json_rpc_error(err);
        }

        if let Some(err) = err.as_provider_error() {
            return Self::from_provider_error(err);
        }

        Err(Self::Provider { inner: format!("middleware error: {err:?}") })
    }
}

impl From<EntryPointAPIErrors> for EntryPointError {
    fn from(err: EntryPointAPIErrors) -> Self {
        match err {
            EntryPointAPIErrors::FailedOp(op) => {
                EntryPointError::FailedOp { index: op.op_index, reason: op.reason }
            }
            EntryPointAPIErrors::FailedOpWithRevert(op) => EntryPointError::FailedOp {
                index: op.op_index,
                reason: match decode_revert_string(op.inner.clone()) {
                    Some(inner) => format!("{} ({inner})", op.reason),
                    None => format!("{} ({})", op.reason, op.inner),
                },
            },
            EntryPointAPIErrors::RevertString(reason) => EntryPointError::ExecutionReverted(reason),
            other => EntryPointError::ExecutionReverted(format!("{other:?}")),
        }
    }
}

// ethers-rs could not handle `require (true, "reason")` or `revert("test failed")` well in this
// case revert with `require` error would ends up with error event signature `0x08c379a0`
// we need to handle it manually
pub fn decode_revert_string(data: Bytes) -> Option<String> {
    if data.len() < 4 {
        return None;
    }
    let (error_sig, reason) = data.split_at(4);
    if error_sig == [0x08, 0xc3, 0x79, 0xa0] {
        <String as AbiDecode>::decode(reason).ok()
    } else {
        None
    }
}

pub fn decode_revert_error(data: Bytes) -> Result<EntryPointAPIErrors, EntryPointError> {
    let decoded = EntryPointAPIErrors::decode(data.as_ref());
    match decoded {
        Ok(res) => Ok(res),
        Err(e) => {
            if let Some(error_str) = decode_revert_string(data) {
                return Ok(EntryPointAPIErrors::RevertString(error_str));
            };

            Err(EntryPointError::Decode {
                inner: format!(
                    "data field can't be deserialized to EntryPointAPIErrors error: {e:?}",
                ),
            })
        }
    }
}
