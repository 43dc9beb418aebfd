use jsonrpsee::types::{error::ErrorCode, ErrorObject, ErrorObjectOwned};
use sluice_bundler::BundlerError;

/// A wrapper for the [ErrorObjectOwned](ErrorObjectOwned) type.
pub struct JsonRpcError(pub ErrorObjectOwned);

impl JsonRpcError {
    /// Internal JSON-RPC error (`-32603`) with the given message
    pub fn internal(message: impl Into<String>) -> Self {
        JsonRpcError(ErrorObject::owned(
            ErrorCode::InternalError.code(),
            message.into(),
            None::<bool>,
        ))
    }
}

impl From<JsonRpcError> for ErrorObjectOwned {
    /// Convert a [JsonRpcError](JsonRpcError) to a [ErrorObjectOwned](ErrorObjectOwned).
    fn from(err: JsonRpcError) -> Self {
        err.0
    }
}

impl From<BundlerError> for JsonRpcError {
    /// Convert a [BundlerError](BundlerError) to a [JsonRpcError](JsonRpcError).
    ///
    /// The bundler does no simulation, so every rejection is reported as an internal error.
    fn from(err: BundlerError) -> Self {
        JsonRpcError::internal(err.to_string())
    }
}
