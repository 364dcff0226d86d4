use serde_json::{Map, Value};

use crate::error::{JsonRpcErrorObject, WireError};
use crate::types::{JsonRpcVersion, RequestId};

/// What a response resolved to: exactly one of `result` or `error`
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseOutcome {
    /// `result` member, possibly `null` for methods that return nothing
    Result(Value),
    /// `error` member
    Error(JsonRpcErrorObject),
}

impl ResponseOutcome {
    pub fn is_error(&self) -> bool {
        matches!(self, ResponseOutcome::Error(_))
    }

    pub fn into_result(self) -> Result<Value, JsonRpcErrorObject> {
        match self {
            ResponseOutcome::Result(value) => Ok(value),
            ResponseOutcome::Error(error) => Err(error),
        }
    }
}

/// A JSON-RPC response object as received from a server.
///
/// Parsed by hand rather than derived: `"result": null` is a legitimate
/// success and must not collapse into "no result member".
#[derive(Debug, Clone, PartialEq)]
pub struct JsonRpcResponse {
    pub version: JsonRpcVersion,
    /// `None` when the server sent `"id": null` (or no id at all)
    pub id: Option<RequestId>,
    pub outcome: ResponseOutcome,
}

impl JsonRpcResponse {
    pub fn success(id: RequestId, result: Value) -> Self {
        Self {
            version: JsonRpcVersion::V2_0,
            id: Some(id),
            outcome: ResponseOutcome::Result(result),
        }
    }

    pub fn failure(id: Option<RequestId>, error: JsonRpcErrorObject) -> Self {
        Self {
            version: JsonRpcVersion::V2_0,
            id,
            outcome: ResponseOutcome::Error(error),
        }
    }

    /// Parse a single response object
    pub fn from_value(value: Value) -> Result<Self, WireError> {
        let mut object = match value {
            Value::Object(object) => object,
            other => {
                return Err(WireError::InvalidResponse(format!(
                    "expected a response object, got {}",
                    other
                )));
            }
        };

        if let Some(version) = object.remove("jsonrpc") {
            serde_json::from_value::<JsonRpcVersion>(version)?;
        }

        let id = match object.remove("id") {
            None | Some(Value::Null) => None,
            Some(raw) => Some(serde_json::from_value::<RequestId>(raw.clone()).map_err(|_| {
                WireError::InvalidResponse(format!("unsupported response id {}", raw))
            })?),
        };

        // `error` wins if a server sends both
        let outcome = if let Some(error) = object.remove("error") {
            ResponseOutcome::Error(serde_json::from_value(error)?)
        } else if let Some(result) = object.remove("result") {
            ResponseOutcome::Result(result)
        } else {
            return Err(WireError::InvalidResponse(
                "response carries neither result nor error".to_string(),
            ));
        };

        Ok(Self {
            version: JsonRpcVersion::V2_0,
            id,
            outcome,
        })
    }

    pub fn to_value(&self) -> Value {
        let mut object = Map::new();
        object.insert(
            "jsonrpc".to_string(),
            Value::String(self.version.as_str().to_string()),
        );
        match &self.outcome {
            ResponseOutcome::Result(result) => {
                object.insert("result".to_string(), result.clone());
            }
            ResponseOutcome::Error(error) => {
                object.insert(
                    "error".to_string(),
                    serde_json::to_value(error).unwrap_or(Value::Null),
                );
            }
        }
        let id = match &self.id {
            Some(RequestId::String(s)) => Value::String(s.clone()),
            Some(RequestId::Number(n)) => Value::from(*n),
            None => Value::Null,
        };
        object.insert("id".to_string(), id);
        Value::Object(object)
    }

    pub fn is_error(&self) -> bool {
        self.outcome.is_error()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_response() {
        let response =
            JsonRpcResponse::from_value(json!({"jsonrpc": "2.0", "result": 19, "id": 1})).unwrap();

        assert_eq!(response.id, Some(RequestId::Number(1)));
        assert_eq!(response.outcome, ResponseOutcome::Result(json!(19)));
    }

    #[test]
    fn test_null_result_is_kept() {
        let response =
            JsonRpcResponse::from_value(json!({"jsonrpc": "2.0", "result": null, "id": "a"}))
                .unwrap();

        assert_eq!(response.outcome, ResponseOutcome::Result(Value::Null));
    }

    #[test]
    fn test_error_response_with_null_id() {
        let response = JsonRpcResponse::from_value(json!({
            "jsonrpc": "2.0",
            "error": {"code": -32700, "message": "Parse error"},
            "id": null
        }))
        .unwrap();

        assert!(response.id.is_none());
        assert!(response.is_error());
        let error = response.outcome.into_result().unwrap_err();
        assert_eq!(error.code, -32700);
    }

    #[test]
    fn test_malformed_responses() {
        assert!(matches!(
            JsonRpcResponse::from_value(json!({"jsonrpc": "2.0", "id": 1})),
            Err(WireError::InvalidResponse(_))
        ));
        assert!(JsonRpcResponse::from_value(json!([1, 2])).is_err());
        assert!(JsonRpcResponse::from_value(json!({"jsonrpc": "1.0", "result": 1, "id": 1})).is_err());
        assert!(JsonRpcResponse::from_value(json!({"result": 1, "id": true})).is_err());
        assert!(JsonRpcResponse::from_value(json!({"error": {"code": "x"}, "id": 1})).is_err());
    }

    #[test]
    fn test_to_value_matches_wire_format() {
        let failure = JsonRpcResponse::failure(
            Some(RequestId::Number(2)),
            JsonRpcErrorObject::method_not_found("nope"),
        );
        assert_eq!(
            failure.to_value(),
            json!({
                "jsonrpc": "2.0",
                "error": {"code": -32601, "message": "Method 'nope' not found"},
                "id": 2
            })
        );

        let parsed = JsonRpcResponse::from_value(failure.to_value()).unwrap();
        assert_eq!(parsed, failure);
    }
}
