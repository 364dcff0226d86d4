//! # JSON-RPC 2.0 Wire Types
//!
//! Transport-agnostic JSON-RPC 2.0 message types as seen from the client side:
//! calls, notifications, batches going out, and responses coming back.
//! This crate does no I/O; delivery lives in `repc-client`.
//!
//! ## Features
//! - Calls always carry an `id`, notifications never serialize one
//! - Positional (array) and named (object) parameters
//! - Batches serialize as a plain JSON array
//! - Tolerant response parsing that keeps `result: null` distinct from a missing result

pub mod error;
pub mod notification;
pub mod payload;
pub mod request;
pub mod response;
pub mod types;

// Re-export main types
pub use error::{JsonRpcErrorCode, JsonRpcErrorObject, WireError};
pub use notification::JsonRpcNotification;
pub use payload::{OutgoingMessage, Payload};
pub use request::{JsonRpcRequest, RequestParams};
pub use response::{JsonRpcResponse, ResponseOutcome};
pub use types::{JsonRpcVersion, RequestId};

/// JSON-RPC 2.0 version constant
pub const JSONRPC_VERSION: &str = "2.0";
