//! Session: a handle bound to one endpoint

use std::sync::Arc;

use repc_json_rpc::Payload;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::builder::{IntoBatch, build_batch, build_call, build_notification, to_params};
use crate::config::SessionConfig;
use crate::dispatch::{FlatClient, PositionalClient};
use crate::error::{ClientError, ClientResult};
use crate::id::{IdGenerator, SequentialIdGenerator};
use crate::options::{CallOptions, Headers, SessionOptions};
use crate::resolver::{BatchResponse, resolve_batch, resolve_call, resolve_notification};
use crate::transport::{RawResponse, RequestContext, RequestKind, SharedTransport};

/// JSON-RPC session bound to one endpoint.
///
/// Cloning is cheap; clones share the transport and the id generator, so
/// ids stay unique across them.
#[derive(Clone, Debug)]
pub struct Session {
    endpoint: String,
    defaults: SessionOptions,
}

impl Session {
    /// Create a session with the default sequential id generator
    pub fn new(endpoint: impl Into<String>, transport: SharedTransport) -> Self {
        Self {
            endpoint: endpoint.into(),
            defaults: SessionOptions::new(transport, Arc::new(SequentialIdGenerator::new())),
        }
    }

    /// Create a session from serializable configuration
    pub fn from_config(config: SessionConfig, transport: SharedTransport) -> Self {
        let mut defaults = SessionOptions::new(transport, config.id_strategy.generator());
        defaults.headers = config.headers;
        Self {
            endpoint: config.endpoint,
            defaults,
        }
    }

    pub fn builder(endpoint: impl Into<String>) -> SessionBuilder {
        SessionBuilder::new(endpoint)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn defaults(&self) -> &SessionOptions {
        &self.defaults
    }

    /// Deliver a prebuilt payload and decode the body, without any JSON-RPC interpretation
    pub async fn send(&self, payload: &Payload, options: &CallOptions) -> ClientResult<Option<Value>> {
        self.deliver(payload, self.defaults.merge(options)).await
    }

    /// Hand the payload to the merged transport and return its raw answer
    async fn exchange(&self, payload: &Payload, options: SessionOptions) -> ClientResult<RawResponse> {
        let kind = RequestKind::of(payload);
        let transport = options.transport.clone();
        let context = RequestContext::new(self.endpoint.clone(), kind, options);

        let raw = transport.transport(&self.endpoint, payload, &context).await?;
        debug!(endpoint = %self.endpoint, kind = %kind, "Transport settled");
        Ok(raw)
    }

    async fn deliver(&self, payload: &Payload, options: SessionOptions) -> ClientResult<Option<Value>> {
        Ok(self.exchange(payload, options).await?.into_json()?)
    }

    /// Call a method; `None` when the remote sent no body at all
    pub async fn call<P: Serialize>(&self, method: &str, params: P) -> ClientResult<Option<Value>> {
        self.call_with(method, params, &CallOptions::default()).await
    }

    /// Call a method with per-call overrides
    pub async fn call_with<P: Serialize>(
        &self,
        method: &str,
        params: P,
        options: &CallOptions,
    ) -> ClientResult<Option<Value>> {
        let options = self.defaults.merge(options);
        let params = to_params(params)?;
        let id = options.id_generator.next_id(method, &params);

        debug!(method = method, id = %id, "Calling method");

        let payload = Payload::Single(build_call(method, params, id.clone()).into());
        let body = self.deliver(&payload, options).await?;
        resolve_call(&id, body)
    }

    /// Call a method and deserialize its result; an absent result reads as JSON `null`
    pub async fn call_as<R, P>(&self, method: &str, params: P) -> ClientResult<R>
    where
        R: DeserializeOwned,
        P: Serialize,
    {
        let result = self.call(method, params).await?;
        Ok(serde_json::from_value(result.unwrap_or(Value::Null))?)
    }

    /// Send a notification; whatever the remote answers is discarded
    pub async fn notify<P: Serialize>(&self, method: &str, params: P) -> ClientResult<()> {
        self.notify_with(method, params, &CallOptions::default()).await
    }

    pub async fn notify_with<P: Serialize>(
        &self,
        method: &str,
        params: P,
        options: &CallOptions,
    ) -> ClientResult<()> {
        let options = self.defaults.merge(options);
        let params = to_params(params)?;

        debug!(method = method, "Sending notification");

        let payload = Payload::Single(build_notification(method, params).into());
        let raw = self.exchange(&payload, options).await?;
        resolve_notification(raw)
    }

    /// Send several calls and notifications in one delivery.
    ///
    /// Error entries come back as `Err` items; the batch itself only fails on
    /// transport or parse errors, or when the server rejects it wholesale.
    pub async fn batch<B: IntoBatch>(&self, entries: B) -> ClientResult<BatchResponse> {
        self.batch_with(entries, &CallOptions::default()).await
    }

    pub async fn batch_with<B: IntoBatch>(
        &self,
        entries: B,
        options: &CallOptions,
    ) -> ClientResult<BatchResponse> {
        let options = self.defaults.merge(options);
        let messages = build_batch(entries.into_batch(), options.id_generator.as_ref())?;

        debug!(entries = messages.len(), "Sending batch");

        let payload = Payload::Batch(messages);
        let body = self.deliver(&payload, options).await?;
        resolve_batch(payload.messages(), body)
    }

    /// Flat call style: `invoke(method, params)`
    pub fn flat(&self) -> FlatClient {
        FlatClient::new(self.clone())
    }

    /// Positional call style: `invoke(method, args)` with `args` sent as the params array
    pub fn positional(&self, options: CallOptions) -> PositionalClient {
        PositionalClient::new(self.clone(), options)
    }
}

/// Builder for creating sessions
pub struct SessionBuilder {
    endpoint: String,
    transport: Option<SharedTransport>,
    id_generator: Option<Arc<dyn IdGenerator>>,
    headers: Headers,
    extensions: serde_json::Map<String, Value>,
}

impl SessionBuilder {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            transport: None,
            id_generator: None,
            headers: Headers::new(),
            extensions: serde_json::Map::new(),
        }
    }

    /// Set transport (required)
    pub fn with_transport(mut self, transport: SharedTransport) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn with_id_generator(mut self, id_generator: Arc<dyn IdGenerator>) -> Self {
        self.id_generator = Some(id_generator);
        self
    }

    /// Default headers, replacing any set so far
    pub fn with_headers(mut self, headers: Headers) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_extension(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extensions.insert(key.into(), value);
        self
    }

    /// Build the session
    pub fn build(self) -> ClientResult<Session> {
        let transport = self
            .transport
            .ok_or_else(|| ClientError::config("Transport must be set before building a session"))?;
        let id_generator = self
            .id_generator
            .unwrap_or_else(|| Arc::new(SequentialIdGenerator::new()));

        let mut defaults = SessionOptions::new(transport, id_generator);
        defaults.headers = self.headers;
        defaults.extensions = self.extensions;

        Ok(Session {
            endpoint: self.endpoint,
            defaults,
        })
    }
}
