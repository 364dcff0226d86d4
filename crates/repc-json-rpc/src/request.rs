use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::WireError;
use crate::types::{JsonRpcVersion, RequestId};

/// Parameters for a JSON-RPC request
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum RequestParams {
    /// Positional parameters as an array
    Array(Vec<Value>),
    /// Named parameters as an object
    Object(Map<String, Value>),
}

impl Default for RequestParams {
    /// Empty positional params, the single default shape for omitted params
    fn default() -> Self {
        RequestParams::Array(Vec::new())
    }
}

impl RequestParams {
    /// Interpret an arbitrary JSON value as request params.
    ///
    /// `null` means "no params" and becomes an empty array. Scalars are
    /// rejected since JSON-RPC 2.0 only allows structured params.
    pub fn from_value(value: Value) -> Result<Self, WireError> {
        match value {
            Value::Null => Ok(RequestParams::default()),
            Value::Array(vec) => Ok(RequestParams::Array(vec)),
            Value::Object(map) => Ok(RequestParams::Object(map)),
            other => Err(WireError::InvalidParams(format!(
                "params must be an array or an object, got {}",
                other
            ))),
        }
    }

    /// Get a parameter by name (for object params)
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            RequestParams::Object(map) => map.get(key),
            RequestParams::Array(_) => None,
        }
    }

    /// Get a parameter by index (for array params only)
    pub fn get_index(&self, index: usize) -> Option<&Value> {
        match self {
            RequestParams::Array(vec) => vec.get(index),
            RequestParams::Object(_) => None,
        }
    }

    /// Check if parameters are empty
    pub fn is_empty(&self) -> bool {
        match self {
            RequestParams::Object(map) => map.is_empty(),
            RequestParams::Array(vec) => vec.is_empty(),
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            RequestParams::Object(map) => Value::Object(map.clone()),
            RequestParams::Array(arr) => Value::Array(arr.clone()),
        }
    }
}

impl From<Map<String, Value>> for RequestParams {
    fn from(map: Map<String, Value>) -> Self {
        RequestParams::Object(map)
    }
}

impl From<Vec<Value>> for RequestParams {
    fn from(vec: Vec<Value>) -> Self {
        RequestParams::Array(vec)
    }
}

/// A JSON-RPC call: a request that expects a correlated response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    #[serde(rename = "jsonrpc")]
    pub version: JsonRpcVersion,
    pub method: String,
    #[serde(default)]
    pub params: RequestParams,
    pub id: RequestId,
}

impl JsonRpcRequest {
    pub fn new(id: RequestId, method: impl Into<String>, params: RequestParams) -> Self {
        Self {
            version: JsonRpcVersion::V2_0,
            method: method.into(),
            params,
            id,
        }
    }

    /// Create a new request with empty positional parameters
    pub fn new_no_params(id: RequestId, method: impl Into<String>) -> Self {
        Self::new(id, method, RequestParams::default())
    }

    /// Get a parameter by name (if params are an object)
    pub fn get_param(&self, name: &str) -> Option<&Value> {
        self.params.get(name)
    }

    /// Get a parameter by index (if params are an array)
    pub fn get_param_index(&self, index: usize) -> Option<&Value> {
        self.params.get_index(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, to_value};

    #[test]
    fn test_request_wire_shape() {
        let request = JsonRpcRequest::new_no_params(RequestId::Number(1), "test_method");

        assert_eq!(
            to_value(&request).unwrap(),
            json!({"jsonrpc": "2.0", "method": "test_method", "params": [], "id": 1})
        );
    }

    #[test]
    fn test_request_with_object_params() {
        let params = RequestParams::from_value(json!({"name": "test", "value": 42})).unwrap();
        let request = JsonRpcRequest::new(RequestId::from("req1"), "set_value", params);

        assert_eq!(request.get_param("name"), Some(&json!("test")));
        assert_eq!(request.get_param("value"), Some(&json!(42)));
        assert_eq!(request.get_param("missing"), None);
        assert_eq!(request.get_param_index(0), None);
    }

    #[test]
    fn test_request_with_array_params() {
        let params = RequestParams::from(vec![json!("test"), json!(42), json!(true)]);
        let request = JsonRpcRequest::new(RequestId::Number(2), "process", params);

        assert_eq!(request.get_param_index(0), Some(&json!("test")));
        assert_eq!(request.get_param_index(2), Some(&json!(true)));
        assert_eq!(request.get_param_index(3), None);
    }

    #[test]
    fn test_params_from_value() {
        assert_eq!(
            RequestParams::from_value(Value::Null).unwrap(),
            RequestParams::Array(vec![])
        );
        assert!(RequestParams::from_value(json!({})).unwrap().is_empty());
        assert!(matches!(
            RequestParams::from_value(json!(5)),
            Err(WireError::InvalidParams(_))
        ));
        assert!(RequestParams::from_value(json!("text")).is_err());
    }
}
