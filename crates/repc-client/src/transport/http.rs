//! HTTP transport: one POST per payload

use async_trait::async_trait;
use parking_lot::Mutex;
use repc_json_rpc::Payload;
use reqwest::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

use crate::config::HttpConfig;
use crate::error::{ClientError, ClientResult, TransportError};
use crate::transport::{
    RawResponse, RequestContext, Transport, TransportStatistics, TransportType,
};

const APPLICATION_JSON: &str = "application/json";

/// HTTP transport posting JSON-encoded payloads
#[derive(Debug, Clone)]
pub struct HttpTransport {
    /// HTTP client
    client: Client,
    /// Statistics
    stats: Arc<Mutex<TransportStatistics>>,
}

impl HttpTransport {
    /// Create a new HTTP transport with default settings
    pub fn new() -> ClientResult<Self> {
        Self::with_config(&HttpConfig::default())
    }

    pub fn with_config(config: &HttpConfig) -> ClientResult<Self> {
        let mut builder = Client::builder()
            .timeout(config.timeout)
            .default_headers(Self::header_map(&config.headers)?);
        if let Some(user_agent) = &config.user_agent {
            builder = builder.user_agent(user_agent.clone());
        }

        let client = builder
            .build()
            .map_err(|e| TransportError::Http(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self::with_client(client))
    }

    /// Create HTTP transport with custom client
    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            stats: Arc::new(Mutex::new(TransportStatistics::default())),
        }
    }

    /// Update statistics
    fn update_stats<F>(&self, update_fn: F)
    where
        F: FnOnce(&mut TransportStatistics),
    {
        let mut stats = self.stats.lock();
        update_fn(&mut stats);
    }

    fn header_map<'a>(
        pairs: impl IntoIterator<Item = (&'a String, &'a String)>,
    ) -> ClientResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        for (name, value) in pairs {
            let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                TransportError::Http(format!("Invalid header name {}: {}", name, e))
            })?;
            let header_value = HeaderValue::from_str(value).map_err(|e| {
                TransportError::Http(format!("Invalid header value for {}: {}", name, e))
            })?;
            headers.insert(header_name, header_value);
        }
        Ok(headers)
    }

    /// Caller headers first, then the JSON content headers which always win
    fn headers(context: &RequestContext) -> ClientResult<HeaderMap> {
        let mut headers = Self::header_map(&context.options.headers)?;
        headers.insert(ACCEPT, HeaderValue::from_static(APPLICATION_JSON));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON));
        Ok(headers)
    }

    /// Build the POST request without sending it
    pub fn build_request(
        &self,
        destination: &str,
        payload: &Payload,
        context: &RequestContext,
    ) -> ClientResult<reqwest::Request> {
        let url = Url::parse(destination)
            .map_err(|e| TransportError::InvalidEndpoint(format!("{}: {}", destination, e)))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(TransportError::InvalidEndpoint(format!(
                "Invalid scheme for HTTP transport: {}",
                url.scheme()
            ))
            .into());
        }

        let body = serde_json::to_vec(payload)?;

        self.client
            .post(url)
            .headers(Self::headers(context)?)
            .body(body)
            .build()
            .map_err(|e| {
                ClientError::from(TransportError::Http(format!("Failed to build request: {}", e)))
            })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn transport(
        &self,
        destination: &str,
        payload: &Payload,
        context: &RequestContext,
    ) -> ClientResult<RawResponse> {
        let request = self.build_request(destination, payload, context)?;

        debug!(destination = destination, kind = %context.kind, "Sending HTTP request");
        self.update_stats(|stats| stats.record_sent(context.kind));

        let response = match self.client.execute(request).await {
            Ok(response) => response,
            Err(e) => {
                self.update_stats(|stats| stats.record_error(e.to_string()));
                return Err(TransportError::Http(format!("Request failed: {}", e)).into());
            }
        };

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            self.update_stats(|stats| stats.record_error(e.to_string()));
            TransportError::Http(format!("Failed to read response body: {}", e))
        })?;

        if !status.is_success() {
            warn!(status = status.as_u16(), destination = destination, "HTTP request failed");
            self.update_stats(|stats| stats.record_error(format!("HTTP {}: {}", status, body)));
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        if !body.trim().is_empty() {
            self.update_stats(|stats| stats.responses_received += 1);
        }
        debug!(status = status.as_u16(), bytes = body.len(), "HTTP response received");

        Ok(RawResponse::Text(body))
    }

    fn transport_type(&self) -> TransportType {
        TransportType::Http
    }

    fn statistics(&self) -> TransportStatistics {
        self.stats.lock().clone()
    }
}
