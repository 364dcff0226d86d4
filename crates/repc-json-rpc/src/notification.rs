use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{request::RequestParams, types::JsonRpcVersion};

/// A JSON-RPC notification (request without an id)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcNotification {
    #[serde(rename = "jsonrpc")]
    pub version: JsonRpcVersion,
    pub method: String,
    #[serde(default)]
    pub params: RequestParams,
}

impl JsonRpcNotification {
    pub fn new(method: impl Into<String>, params: RequestParams) -> Self {
        Self {
            version: JsonRpcVersion::V2_0,
            method: method.into(),
            params,
        }
    }

    /// Create a new notification with empty positional parameters
    pub fn new_no_params(method: impl Into<String>) -> Self {
        Self::new(method, RequestParams::default())
    }

    /// Get a parameter by name (if params are an object)
    pub fn get_param(&self, name: &str) -> Option<&Value> {
        self.params.get(name)
    }
}
