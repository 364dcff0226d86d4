//! Session defaults and per-call overrides

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::id::IdGenerator;
use crate::transport::SharedTransport;

/// Extra HTTP-style headers attached to each delivery
pub type Headers = HashMap<String, String>;

/// Options in effect for one delivery: session defaults with call overrides applied
#[derive(Clone)]
pub struct SessionOptions {
    /// Headers a transport should attach (the HTTP transport sends them)
    pub headers: Headers,
    /// Delivery implementation
    pub transport: SharedTransport,
    /// Id strategy for calls
    pub id_generator: Arc<dyn IdGenerator>,
    /// Free-form settings for custom transports (tokens, deadlines, routing keys)
    pub extensions: Map<String, Value>,
}

impl SessionOptions {
    pub fn new(transport: SharedTransport, id_generator: Arc<dyn IdGenerator>) -> Self {
        Self {
            headers: Headers::new(),
            transport,
            id_generator,
            extensions: Map::new(),
        }
    }

    /// Shallow merge: every key the call sets replaces the default wholesale.
    /// Extensions are the exception and merge key by key.
    pub fn merge(&self, overrides: &CallOptions) -> SessionOptions {
        let mut extensions = self.extensions.clone();
        for (key, value) in &overrides.extensions {
            extensions.insert(key.clone(), value.clone());
        }

        SessionOptions {
            headers: overrides
                .headers
                .clone()
                .unwrap_or_else(|| self.headers.clone()),
            transport: overrides
                .transport
                .clone()
                .unwrap_or_else(|| self.transport.clone()),
            id_generator: overrides
                .id_generator
                .clone()
                .unwrap_or_else(|| self.id_generator.clone()),
            extensions,
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn extension(&self, key: &str) -> Option<&Value> {
        self.extensions.get(key)
    }
}

impl fmt::Debug for SessionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionOptions")
            .field("headers", &self.headers)
            .field("transport", &self.transport.transport_type())
            .field("extensions", &self.extensions)
            .finish_non_exhaustive()
    }
}

/// Per-call overrides; unset fields fall back to the session defaults
#[derive(Clone, Default)]
pub struct CallOptions {
    pub headers: Option<Headers>,
    pub transport: Option<SharedTransport>,
    pub id_generator: Option<Arc<dyn IdGenerator>>,
    pub extensions: Map<String, Value>,
}

impl CallOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the session's headers for this call
    pub fn with_headers(mut self, headers: Headers) -> Self {
        self.headers = Some(headers);
        self
    }

    /// Add one header to this call's header set (starts empty, replacing the defaults)
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .get_or_insert_with(Headers::new)
            .insert(name.into(), value.into());
        self
    }

    pub fn with_transport(mut self, transport: SharedTransport) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn with_id_generator(mut self, id_generator: Arc<dyn IdGenerator>) -> Self {
        self.id_generator = Some(id_generator);
        self
    }

    pub fn with_extension(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extensions.insert(key.into(), value);
        self
    }
}

impl fmt::Debug for CallOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallOptions")
            .field("headers", &self.headers)
            .field(
                "transport",
                &self.transport.as_ref().map(|t| t.transport_type()),
            )
            .field("id_generator", &self.id_generator.is_some())
            .field("extensions", &self.extensions)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::{SequentialIdGenerator, UuidIdGenerator};
    use crate::transport::{InMemoryTransport, TransportType};
    use repc_json_rpc::RequestParams;
    use serde_json::json;

    fn defaults() -> SessionOptions {
        let mut options = SessionOptions::new(
            Arc::new(InMemoryTransport::silent()),
            Arc::new(SequentialIdGenerator::new()),
        );
        options
            .headers
            .insert("Authorization".to_string(), "Bearer default".to_string());
        options
            .headers
            .insert("X-Trace".to_string(), "on".to_string());
        options.extensions.insert("region".to_string(), json!("eu"));
        options
    }

    #[test]
    fn test_merge_without_overrides_keeps_defaults() {
        let merged = defaults().merge(&CallOptions::new());

        assert_eq!(merged.header("authorization"), Some("Bearer default"));
        assert_eq!(merged.headers.len(), 2);
        assert_eq!(merged.extension("region"), Some(&json!("eu")));
    }

    #[test]
    fn test_call_headers_replace_defaults() {
        let merged = defaults().merge(&CallOptions::new().with_header("Authorization", "Bearer call"));

        assert_eq!(merged.header("Authorization"), Some("Bearer call"));
        assert_eq!(merged.header("X-Trace"), None);
    }

    #[test]
    fn test_extensions_merge_per_key() {
        let merged = defaults().merge(&CallOptions::new().with_extension("deadline_ms", json!(50)));

        assert_eq!(merged.extension("region"), Some(&json!("eu")));
        assert_eq!(merged.extension("deadline_ms"), Some(&json!(50)));
    }

    #[test]
    fn test_transport_and_id_overrides() {
        let merged = defaults().merge(
            &CallOptions::new()
                .with_id_generator(Arc::new(UuidIdGenerator))
                .with_transport(Arc::new(InMemoryTransport::silent())),
        );

        let id = merged.id_generator.next_id("m", &RequestParams::default());
        assert!(id.as_str().is_some());
        assert_eq!(merged.transport.transport_type(), TransportType::InMemory);
    }
}
