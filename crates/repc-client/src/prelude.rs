//! Prelude module for common client imports
//!
//! ```rust
//! use repc_client::prelude::*;
//! ```

pub use crate::{
    BatchEntry, BatchResponse, CallOptions, ClientError, ClientResult, EntryKind, RpcError,
    Session, SessionBuilder,
};

pub use crate::transport::{InMemoryTransport, SharedTransport, Transport};

#[cfg(feature = "http")]
pub use crate::transport::HttpTransport;

pub use repc_json_rpc::{RequestId, RequestParams};

// Essential async trait for custom transports
pub use async_trait::async_trait;

pub use serde_json::{Value, json};
pub use std::sync::Arc;
