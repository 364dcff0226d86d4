//! Transport layer: pure delivery of serialized payloads
//!
//! A transport receives a destination, the payload and a [`RequestContext`]
//! and hands back whatever the remote answered. It never looks at JSON-RPC
//! semantics; correlation and error unwrapping happen in the resolver.

use async_trait::async_trait;
use repc_json_rpc::{OutgoingMessage, Payload};
use serde_json::Value;
use std::sync::Arc;

use crate::error::ClientResult;
use crate::options::SessionOptions;

#[cfg(feature = "http")]
pub mod http;
pub mod memory;

#[cfg(feature = "http")]
pub use http::HttpTransport;
pub use memory::{Delivery, InMemoryTransport};

/// Transport type enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportType {
    /// HTTP POST
    Http,
    /// In-process handler
    InMemory,
    /// Caller supplied implementation
    Custom,
}

impl std::fmt::Display for TransportType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportType::Http => write!(f, "HTTP"),
            TransportType::InMemory => write!(f, "in-memory"),
            TransportType::Custom => write!(f, "custom"),
        }
    }
}

/// Shape of the payload being delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Call,
    Notification,
    Batch,
}

impl RequestKind {
    pub fn of(payload: &Payload) -> Self {
        match payload {
            Payload::Single(OutgoingMessage::Call(_)) => RequestKind::Call,
            Payload::Single(OutgoingMessage::Notification(_)) => RequestKind::Notification,
            Payload::Batch(_) => RequestKind::Batch,
        }
    }
}

impl std::fmt::Display for RequestKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestKind::Call => write!(f, "call"),
            RequestKind::Notification => write!(f, "notification"),
            RequestKind::Batch => write!(f, "batch"),
        }
    }
}

/// Per-delivery context handed to the transport
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Logical address the session is bound to
    pub destination: String,
    pub kind: RequestKind,
    /// Session defaults merged with this call's overrides
    pub options: SessionOptions,
}

impl RequestContext {
    pub fn new(destination: impl Into<String>, kind: RequestKind, options: SessionOptions) -> Self {
        Self {
            destination: destination.into(),
            kind,
            options,
        }
    }
}

/// What came back from the remote
#[derive(Debug, Clone, PartialEq)]
pub enum RawResponse {
    /// Unparsed body text
    Text(String),
    /// Body the transport already decoded
    Json(Value),
}

impl RawResponse {
    pub fn empty() -> Self {
        RawResponse::Text(String::new())
    }

    /// Decode the body. A blank body (or JSON `null`) means "no response"
    /// and is not an error.
    pub fn into_json(self) -> serde_json::Result<Option<Value>> {
        match self {
            RawResponse::Text(text) => {
                let text = text.trim();
                if text.is_empty() {
                    Ok(None)
                } else {
                    serde_json::from_str(text).map(Some)
                }
            }
            RawResponse::Json(Value::Null) => Ok(None),
            RawResponse::Json(value) => Ok(Some(value)),
        }
    }
}

impl From<String> for RawResponse {
    fn from(text: String) -> Self {
        RawResponse::Text(text)
    }
}

impl From<Value> for RawResponse {
    fn from(value: Value) -> Self {
        RawResponse::Json(value)
    }
}

/// Delivery contract every transport implements
#[async_trait]
pub trait Transport: Send + Sync {
    /// Deliver `payload` to `destination` and return the raw answer
    async fn transport(
        &self,
        destination: &str,
        payload: &Payload,
        context: &RequestContext,
    ) -> ClientResult<RawResponse>;

    /// Get transport type
    fn transport_type(&self) -> TransportType {
        TransportType::Custom
    }

    /// Get transport statistics
    fn statistics(&self) -> TransportStatistics {
        TransportStatistics::default()
    }
}

/// Shared handle to a transport
pub type SharedTransport = Arc<dyn Transport>;

/// Transport statistics for monitoring
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransportStatistics {
    /// Number of single calls delivered
    pub requests_sent: u64,
    /// Number of single notifications delivered
    pub notifications_sent: u64,
    /// Number of batches delivered
    pub batches_sent: u64,
    /// Number of non-empty bodies received
    pub responses_received: u64,
    /// Number of failed deliveries
    pub errors: u64,
    /// Last error message
    pub last_error: Option<String>,
}

impl TransportStatistics {
    pub fn record_sent(&mut self, kind: RequestKind) {
        match kind {
            RequestKind::Call => self.requests_sent += 1,
            RequestKind::Notification => self.notifications_sent += 1,
            RequestKind::Batch => self.batches_sent += 1,
        }
    }

    pub fn record_error(&mut self, message: impl Into<String>) {
        self.errors += 1;
        self.last_error = Some(message.into());
    }
}
