//! # JSON-RPC 2.0 Client Library
//!
//! A session-oriented JSON-RPC 2.0 client with pluggable transports. A
//! [`Session`] is bound to one endpoint and holds default headers, a
//! transport and an id generator; every call can override any of them.
//!
//! ## Features
//!
//! - **Calls, notifications and batches** built from plain method names and serializable params
//! - **Pluggable transports**: HTTP via `reqwest`, or in-process for tests and embedding
//! - **Id correlation**: batch responses are matched to calls by id, not position
//! - **Alternative call styles**: flat `invoke(method, params)` and positional `invoke(method, args)`
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use repc_client::{SessionBuilder, transport::HttpTransport};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let session = SessionBuilder::new("http://localhost:8080/rpc")
//!         .with_transport(Arc::new(HttpTransport::new()?))
//!         .with_header("Authorization", "Bearer token")
//!         .build()?;
//!
//!     let sum: i64 = session.call_as("add", [1, 2]).await?;
//!     println!("1 + 2 = {}", sum);
//!
//!     session.notify("log", ["hello"]).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Batches
//!
//! ```rust,no_run
//! # use repc_client::{BatchEntry, Session};
//! # async fn run(session: Session) -> repc_client::ClientResult<()> {
//! let batch = session
//!     .batch(vec![
//!         BatchEntry::call("add", serde_json::json!([1, 2])),
//!         BatchEntry::notification("log", serde_json::json!(["batch sent"])),
//!     ])
//!     .await?;
//!
//! for item in &batch {
//!     println!("{:?} => {:?}", item.id, item.outcome);
//! }
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod id;
pub mod options;
pub mod prelude;
pub mod resolver;
pub mod session;
pub mod transport;

// Re-export main types
pub use builder::{BatchEntry, EntryKind, IntoBatch};
pub use config::{HttpConfig, SessionConfig};
pub use dispatch::{FlatClient, MethodHandle, PositionalClient};
pub use error::{ClientError, ClientResult, ProtocolError, RpcError, TransportError};
pub use id::{IdGenerator, IdStrategy, SequentialIdGenerator, UuidIdGenerator};
pub use options::{CallOptions, Headers, SessionOptions};
pub use resolver::{BatchItem, BatchResponse};
pub use session::{Session, SessionBuilder};

// Re-export transport types
pub use transport::{RawResponse, RequestContext, RequestKind, SharedTransport, Transport, TransportType};

// Re-export wire types for convenience
pub use repc_json_rpc::{JsonRpcErrorObject, OutgoingMessage, Payload, RequestId, RequestParams};
