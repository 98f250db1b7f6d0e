//! Application error types.
//!
//! All errors use `thiserror` for automatic Error trait derivation and map onto
//! JSON-RPC error objects at the MCP boundary.

use thiserror::Error;

use crate::mcp::protocol::{RpcError, METHOD_NOT_FOUND};

/// Application result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error enum for the MCP server.
///
/// Gateway failures never appear here: they are returned as values
/// (see [`crate::gateway::GatewayError`]).
#[derive(Error, Debug)]
pub enum Error {
    /// Argument validation errors (map to JSON-RPC INVALID_PARAMS).
    #[error("validation error: {0}")]
    Validation(String),

    /// Unknown tool or method (map to JSON-RPC METHOD_NOT_FOUND).
    #[error("not found: {0}")]
    NotFound(String),

    /// Configuration errors detected at startup.
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal errors (map to JSON-RPC INTERNAL_ERROR).
    #[error("internal error: {0}")]
    Internal(String),

    /// Serialization/deserialization errors.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O errors.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Convert to a JSON-RPC error object.
    pub fn to_rpc_error(&self) -> RpcError {
        match self {
            Error::Validation(msg) => RpcError::invalid_params(msg.clone()),
            Error::NotFound(msg) => RpcError::new(METHOD_NOT_FOUND, msg.clone()),
            Error::Config(msg) | Error::Internal(msg) => RpcError::internal(msg.clone()),
            Error::Serialization(e) => RpcError::internal(format!("serialization error: {}", e)),
            Error::Io(e) => RpcError::internal(format!("io error: {}", e)),
        }
    }
}

// Convenience constructors
impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

impl From<Error> for RpcError {
    fn from(err: Error) -> Self {
        err.to_rpc_error()
    }
}
