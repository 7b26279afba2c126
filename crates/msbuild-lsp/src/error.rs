//! Errors surfaced to the client as JSON-RPC errors.

use msbuild_lsp_core::CoreError;
use tower_lsp::jsonrpc;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// A request arrived before `initialize` completed.
    #[error("server has not been initialized")]
    NotInitialized,

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl From<ServerError> for jsonrpc::Error {
    fn from(err: ServerError) -> Self {
        match err {
            ServerError::NotInitialized => jsonrpc::Error {
                code: jsonrpc::ErrorCode::ServerError(-32002),
                message: err.to_string().into(),
                data: None,
            },
            // Asking about a document that was never opened is a client bug
            ServerError::Core(CoreError::DocumentNotOpen { .. }) => {
                jsonrpc::Error::invalid_params(err.to_string())
            }
        }
    }
}
