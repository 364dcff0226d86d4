//! Error types for JSON-RPC client operations

use repc_json_rpc::{JsonRpcErrorCode, JsonRpcErrorObject, RequestId, WireError};
use serde_json::Value;
use thiserror::Error;

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Error raised (or returned inside a batch) when the remote answers with an `error` member
#[derive(Error, Debug, Clone, PartialEq)]
#[error("JSON-RPC error (code {code}): {message}")]
pub struct RpcError {
    pub code: i64,
    pub message: String,
    pub data: Option<Value>,
}

impl RpcError {
    pub fn new(code: i64, message: impl Into<String>, data: Option<Value>) -> Self {
        Self {
            code,
            message: message.into(),
            data,
        }
    }

    pub fn kind(&self) -> JsonRpcErrorCode {
        JsonRpcErrorCode::from_code(self.code)
    }

    pub fn is_method_not_found(&self) -> bool {
        self.kind() == JsonRpcErrorCode::MethodNotFound
    }

    /// Implementation-defined server error range (-32099..=-32000)
    pub fn is_server_error(&self) -> bool {
        matches!(self.kind(), JsonRpcErrorCode::ServerError(_))
    }
}

impl From<JsonRpcErrorObject> for RpcError {
    fn from(error: JsonRpcErrorObject) -> Self {
        Self {
            code: error.code,
            message: error.message,
            data: error.data,
        }
    }
}

/// Comprehensive error type for client operations
#[derive(Error, Debug)]
pub enum ClientError {
    /// The remote returned a JSON-RPC error object
    #[error(transparent)]
    Rpc(#[from] RpcError),

    /// Delivery failed; passed through from the transport untouched
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Protocol-level errors detected locally
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// JSON parsing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Transport-specific errors
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("HTTP transport error: {0}")]
    Http(String),

    #[error("HTTP status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("{0}")]
    Custom(String),
}

/// Protocol-specific errors
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("Batch must contain at least one request")]
    EmptyBatch,

    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    #[error("Invalid JSON-RPC response: {0}")]
    InvalidResponse(String),

    #[error("Response id {actual} does not match request id {expected}")]
    IdMismatch {
        expected: RequestId,
        actual: RequestId,
    },
}

impl From<WireError> for ClientError {
    fn from(error: WireError) -> Self {
        match error {
            WireError::Json(e) => Self::Json(e),
            WireError::InvalidParams(message) => ProtocolError::InvalidParams(message).into(),
            WireError::InvalidResponse(message) => ProtocolError::InvalidResponse(message).into(),
        }
    }
}

impl ClientError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a transport error carrying a free-form message
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(TransportError::Custom(message.into()))
    }

    /// Get the JSON-RPC error code if the remote returned an error object
    pub fn error_code(&self) -> Option<i64> {
        match self {
            Self::Rpc(error) => Some(error.code),
            _ => None,
        }
    }

    pub fn as_rpc_error(&self) -> Option<&RpcError> {
        match self {
            Self::Rpc(error) => Some(error),
            _ => None,
        }
    }

    pub fn is_rpc_error(&self) -> bool {
        matches!(self, Self::Rpc(_))
    }

    pub fn is_transport_error(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Malformed bodies and local protocol violations
    pub fn is_protocol_error(&self) -> bool {
        matches!(self, Self::Protocol(_) | Self::Json(_))
    }
}

/// Convenience macro for creating transport errors from custom transports
#[macro_export]
macro_rules! transport_error {
    ($($arg:tt)*) => {
        $crate::error::ClientError::transport(format!($($arg)*))
    };
}
