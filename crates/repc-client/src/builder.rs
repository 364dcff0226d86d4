//! Request shaping: calls, notifications and batches

use repc_json_rpc::{
    JsonRpcNotification, JsonRpcRequest, OutgoingMessage, RequestId, RequestParams,
};
use serde::Serialize;
use serde_json::Value;

use crate::error::{ClientResult, ProtocolError};
use crate::id::IdGenerator;

/// Whether a batch entry expects a response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EntryKind {
    #[default]
    Call,
    Notification,
}

/// One entry of a batch before ids are allocated
#[derive(Debug, Clone, PartialEq)]
pub struct BatchEntry {
    pub kind: EntryKind,
    pub method: String,
    /// Raw params; `null` means none
    pub params: Value,
}

impl BatchEntry {
    pub fn call(method: impl Into<String>, params: Value) -> Self {
        Self {
            kind: EntryKind::Call,
            method: method.into(),
            params,
        }
    }

    pub fn notification(method: impl Into<String>, params: Value) -> Self {
        Self {
            kind: EntryKind::Notification,
            method: method.into(),
            params,
        }
    }
}

/// `(method, params)` is a call
impl<S: Into<String>> From<(S, Value)> for BatchEntry {
    fn from((method, params): (S, Value)) -> Self {
        Self::call(method, params)
    }
}

/// `(kind, method, params)` carries an explicit marker
impl<S: Into<String>> From<(EntryKind, S, Value)> for BatchEntry {
    fn from((kind, method, params): (EntryKind, S, Value)) -> Self {
        Self {
            kind,
            method: method.into(),
            params,
        }
    }
}

/// Anything accepted where a batch is expected.
///
/// A lone entry becomes a one-element batch.
pub trait IntoBatch {
    fn into_batch(self) -> Vec<BatchEntry>;
}

impl IntoBatch for BatchEntry {
    fn into_batch(self) -> Vec<BatchEntry> {
        vec![self]
    }
}

impl<S: Into<String>> IntoBatch for (S, Value) {
    fn into_batch(self) -> Vec<BatchEntry> {
        vec![self.into()]
    }
}

impl<S: Into<String>> IntoBatch for (EntryKind, S, Value) {
    fn into_batch(self) -> Vec<BatchEntry> {
        vec![self.into()]
    }
}

impl<T: Into<BatchEntry>> IntoBatch for Vec<T> {
    fn into_batch(self) -> Vec<BatchEntry> {
        self.into_iter().map(Into::into).collect()
    }
}

impl<T: Into<BatchEntry>, const N: usize> IntoBatch for [T; N] {
    fn into_batch(self) -> Vec<BatchEntry> {
        self.into_iter().map(Into::into).collect()
    }
}

/// Serialize caller params into JSON-RPC params (`()`/`null` becomes `[]`)
pub fn to_params<P: Serialize>(params: P) -> ClientResult<RequestParams> {
    let value = serde_json::to_value(params)?;
    Ok(RequestParams::from_value(value)?)
}

/// Shape a call; the id is always present
pub fn build_call(method: &str, params: RequestParams, id: RequestId) -> JsonRpcRequest {
    JsonRpcRequest::new(id, method, params)
}

/// Shape a notification; it never carries an id
pub fn build_notification(method: &str, params: RequestParams) -> JsonRpcNotification {
    JsonRpcNotification::new(method, params)
}

/// Shape a batch, drawing one id per call from `ids`
pub fn build_batch(
    entries: Vec<BatchEntry>,
    ids: &dyn IdGenerator,
) -> ClientResult<Vec<OutgoingMessage>> {
    if entries.is_empty() {
        return Err(ProtocolError::EmptyBatch.into());
    }

    // Validate every entry before any id is drawn
    let validated = entries
        .into_iter()
        .map(|entry| -> ClientResult<(EntryKind, String, RequestParams)> {
            let params = RequestParams::from_value(entry.params)?;
            Ok((entry.kind, entry.method, params))
        })
        .collect::<ClientResult<Vec<_>>>()?;

    Ok(validated
        .into_iter()
        .map(|(kind, method, params)| match kind {
            EntryKind::Call => {
                let id = ids.next_id(&method, &params);
                build_call(&method, params, id).into()
            }
            EntryKind::Notification => build_notification(&method, params).into(),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;
    use crate::id::SequentialIdGenerator;
    use serde_json::{json, to_value};

    #[test]
    fn test_call_always_has_id() {
        let request = build_call("sum", to_params(json!([1, 2])).unwrap(), RequestId::Number(7));
        assert_eq!(
            to_value(&request).unwrap(),
            json!({"jsonrpc": "2.0", "method": "sum", "params": [1, 2], "id": 7})
        );
    }

    #[test]
    fn test_notification_never_has_id() {
        let notification = build_notification("log", to_params(json!({"line": "x"})).unwrap());
        let value = to_value(&notification).unwrap();
        assert!(value.get("id").is_none());
        assert_eq!(value["params"], json!({"line": "x"}));
    }

    #[test]
    fn test_empty_params_default_to_array() {
        assert_eq!(to_params(()).unwrap(), RequestParams::Array(vec![]));
        assert_eq!(to_params(Value::Null).unwrap(), RequestParams::Array(vec![]));
        assert!(matches!(
            to_params(3),
            Err(ClientError::Protocol(ProtocolError::InvalidParams(_)))
        ));
    }

    #[test]
    fn test_same_call_differs_only_in_id() {
        let params = to_params(json!({"a": 1})).unwrap();
        let first = to_value(build_call("m", params.clone(), RequestId::Number(1))).unwrap();
        let mut second = to_value(build_call("m", params, RequestId::from("two"))).unwrap();

        assert_ne!(first, second);
        second["id"] = json!(1);
        assert_eq!(first, second);
    }

    #[test]
    fn test_batch_allocates_ids_for_calls_only() {
        let ids = SequentialIdGenerator::new();
        let batch = build_batch(
            vec![
                BatchEntry::call("a", json!([1])),
                BatchEntry::notification("b", Value::Null),
                BatchEntry::call("c", json!({"k": true})),
            ],
            &ids,
        )
        .unwrap();

        assert_eq!(batch[0].id(), Some(&RequestId::Number(1)));
        assert!(batch[1].is_notification());
        assert_eq!(batch[2].id(), Some(&RequestId::Number(2)));
        assert_eq!(ids.last_id(), 2);
    }

    #[test]
    fn test_empty_batch_rejected() {
        let ids = SequentialIdGenerator::new();
        assert!(matches!(
            build_batch(vec![], &ids),
            Err(ClientError::Protocol(ProtocolError::EmptyBatch))
        ));
        assert_eq!(ids.last_id(), 0);
    }

    #[test]
    fn test_into_batch_normalization() {
        assert_eq!(("ping", Value::Null).into_batch().len(), 1);
        assert_eq!(BatchEntry::call("ping", Value::Null).into_batch().len(), 1);

        let entries = [
            (EntryKind::Call, "a", json!([])),
            (EntryKind::Notification, "b", json!([])),
        ]
        .into_batch();
        assert_eq!(entries[1].kind, EntryKind::Notification);

        let array_form = vec![("a", json!([1])), ("b", json!([2]))].into_batch();
        assert!(array_form.iter().all(|e| e.kind == EntryKind::Call));
    }

    #[test]
    fn test_invalid_params_consume_no_ids() {
        let ids = SequentialIdGenerator::new();
        let err = build_batch(
            vec![BatchEntry::call("a", json!([])), BatchEntry::call("b", json!(5))],
            &ids,
        )
        .unwrap_err();

        assert!(err.is_protocol_error());
        assert_eq!(ids.last_id(), 0);
    }
}
