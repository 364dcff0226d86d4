//! In-process transport for tests and embedded servers

use async_trait::async_trait;
use futures::FutureExt;
use futures::future::BoxFuture;
use parking_lot::Mutex;
use repc_json_rpc::{
    JsonRpcErrorObject, JsonRpcResponse, OutgoingMessage, Payload, RequestParams,
};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use crate::error::ClientResult;
use crate::options::Headers;
use crate::transport::{
    RawResponse, RequestContext, RequestKind, Transport, TransportStatistics, TransportType,
};

type Handler = dyn Fn(Value, RequestContext) -> BoxFuture<'static, ClientResult<RawResponse>>
    + Send
    + Sync;

/// A payload as it reached the in-memory transport
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub destination: String,
    pub kind: RequestKind,
    /// Serialized payload exactly as it would go over the wire
    pub payload: Value,
    pub headers: Headers,
}

/// Transport that hands payloads to a handler in the same process
pub struct InMemoryTransport {
    handler: Arc<Handler>,
    deliveries: Arc<Mutex<Vec<Delivery>>>,
    recording: bool,
    stats: Arc<Mutex<TransportStatistics>>,
}

impl InMemoryTransport {
    /// Async handler receiving the serialized payload and the request context
    pub fn from_async_fn<F>(handler: F) -> Self
    where
        F: Fn(Value, RequestContext) -> BoxFuture<'static, ClientResult<RawResponse>>
            + Send
            + Sync
            + 'static,
    {
        Self {
            handler: Arc::new(handler),
            deliveries: Arc::new(Mutex::new(Vec::new())),
            recording: true,
            stats: Arc::new(Mutex::new(TransportStatistics::default())),
        }
    }

    /// Stop keeping a delivery log, for long-lived in-process servers
    pub fn without_recording(mut self) -> Self {
        self.recording = false;
        self
    }

    /// Synchronous handler producing the raw answer
    pub fn from_fn<F>(handler: F) -> Self
    where
        F: Fn(Value, &RequestContext) -> ClientResult<RawResponse> + Send + Sync + 'static,
    {
        Self::from_async_fn(move |payload, context| {
            futures::future::ready(handler(payload, &context)).boxed()
        })
    }

    /// Handler answering with already-decoded JSON, `None` for an empty body
    pub fn json<F>(handler: F) -> Self
    where
        F: Fn(Value) -> Option<Value> + Send + Sync + 'static,
    {
        Self::from_fn(move |payload, _| {
            Ok(handler(payload)
                .map(RawResponse::Json)
                .unwrap_or_else(RawResponse::empty))
        })
    }

    /// Always answers with the same body text
    pub fn text(body: impl Into<String>) -> Self {
        let body = body.into();
        Self::from_fn(move |_, _| Ok(RawResponse::Text(body.clone())))
    }

    /// Always answers with an empty body
    pub fn silent() -> Self {
        Self::text(String::new())
    }

    /// A minimal JSON-RPC server: dispatches every call to `method_handler`,
    /// answers with matching ids, stays quiet for notifications and answers
    /// nothing at all when a batch holds only notifications. Empty batches and
    /// payloads that are not request objects get a single `Invalid Request` error.
    pub fn server<F>(method_handler: F) -> Self
    where
        F: Fn(&str, &RequestParams) -> Result<Value, JsonRpcErrorObject> + Send + Sync + 'static,
    {
        Self::from_fn(move |payload, _| {
            let payload = match serde_json::from_value::<Payload>(payload) {
                Ok(Payload::Batch(messages)) if messages.is_empty() => {
                    return Ok(invalid_request(None));
                }
                Ok(payload) => payload,
                Err(e) => return Ok(invalid_request(Some(Value::String(e.to_string())))),
            };
            let answer = |message: &OutgoingMessage| -> Option<Value> {
                let result = method_handler(message.method(), message.params());
                let id = message.id()?.clone();
                let response = match result {
                    Ok(value) => JsonRpcResponse::success(id, value),
                    Err(error) => JsonRpcResponse::failure(Some(id), error),
                };
                Some(response.to_value())
            };

            Ok(match payload {
                Payload::Single(message) => answer(&message)
                    .map(RawResponse::Json)
                    .unwrap_or_else(RawResponse::empty),
                Payload::Batch(messages) => {
                    let responses: Vec<Value> = messages.iter().filter_map(answer).collect();
                    if responses.is_empty() {
                        RawResponse::empty()
                    } else {
                        RawResponse::Json(Value::Array(responses))
                    }
                }
            })
        })
    }

    /// Every payload delivered so far, oldest first
    pub fn deliveries(&self) -> Vec<Delivery> {
        self.deliveries.lock().clone()
    }

    pub fn last_delivery(&self) -> Option<Delivery> {
        self.deliveries.lock().last().cloned()
    }

    /// Drop the delivery log, returning how many entries it held
    pub fn clear_deliveries(&self) -> usize {
        let mut deliveries = self.deliveries.lock();
        let count = deliveries.len();
        deliveries.clear();
        count
    }
}

fn invalid_request(data: Option<Value>) -> RawResponse {
    RawResponse::Json(JsonRpcResponse::failure(None, JsonRpcErrorObject::invalid_request(data)).to_value())
}

impl std::fmt::Debug for InMemoryTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryTransport")
            .field("deliveries", &self.deliveries.lock().len())
            .field("recording", &self.recording)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Transport for InMemoryTransport {
    async fn transport(
        &self,
        destination: &str,
        payload: &Payload,
        context: &RequestContext,
    ) -> ClientResult<RawResponse> {
        let payload = serde_json::to_value(payload)?;

        debug!(destination = destination, kind = %context.kind, "Delivering payload in memory");

        if self.recording {
            self.deliveries.lock().push(Delivery {
                destination: destination.to_string(),
                kind: context.kind,
                payload: payload.clone(),
                headers: context.options.headers.clone(),
            });
        }
        self.stats.lock().record_sent(context.kind);

        let result = (self.handler)(payload, context.clone()).await;

        let mut stats = self.stats.lock();
        match &result {
            Ok(RawResponse::Text(text)) if text.trim().is_empty() => {}
            Ok(_) => stats.responses_received += 1,
            Err(e) => stats.record_error(e.to_string()),
        }

        result
    }

    fn transport_type(&self) -> TransportType {
        TransportType::InMemory
    }

    fn statistics(&self) -> TransportStatistics {
        self.stats.lock().clone()
    }
}
