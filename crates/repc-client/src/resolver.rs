//! Response resolution: correlation, error unwrapping, result extraction

use std::collections::HashMap;

use repc_json_rpc::{JsonRpcResponse, OutgoingMessage, RequestId};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{ClientResult, ProtocolError, RpcError};
use crate::transport::RawResponse;

/// One resolved entry of a batch response
#[derive(Debug, Clone, PartialEq)]
pub struct BatchItem {
    /// Id of the call this entry answers; `None` for entries the server could not attribute
    pub id: Option<RequestId>,
    /// `Err` when the entry carried an `error` member
    pub outcome: Result<Value, RpcError>,
}

impl BatchItem {
    pub fn is_error(&self) -> bool {
        self.outcome.is_err()
    }
}

/// Resolved batch: one item per response entry, never raised as a whole
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchResponse {
    /// Answers to calls in request order, then unattributable entries in arrival order
    pub items: Vec<BatchItem>,
    /// Calls the server never answered
    pub missing: Vec<RequestId>,
}

impl BatchResponse {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BatchItem> {
        self.items.iter()
    }

    /// Outcome for the call that was sent with `id`
    pub fn get(&self, id: &RequestId) -> Option<&Result<Value, RpcError>> {
        self.items
            .iter()
            .find(|item| item.id.as_ref() == Some(id))
            .map(|item| &item.outcome)
    }

    pub fn error_count(&self) -> usize {
        self.items.iter().filter(|item| item.is_error()).count()
    }

    /// Drop the ids and keep just the outcomes
    pub fn into_results(self) -> Vec<Result<Value, RpcError>> {
        self.items.into_iter().map(|item| item.outcome).collect()
    }
}

impl IntoIterator for BatchResponse {
    type Item = BatchItem;
    type IntoIter = std::vec::IntoIter<BatchItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a BatchResponse {
    type Item = &'a BatchItem;
    type IntoIter = std::slice::Iter<'a, BatchItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Resolve the answer to a single call.
///
/// No body resolves to `None`. An `error` member is raised as [`RpcError`].
pub fn resolve_call(expected: &RequestId, body: Option<Value>) -> ClientResult<Option<Value>> {
    let Some(body) = body else {
        debug!(id = %expected, "Call resolved without a response body");
        return Ok(None);
    };

    if body.is_array() {
        return Err(ProtocolError::InvalidResponse(
            "expected a single response object, got an array".to_string(),
        )
        .into());
    }

    let response = JsonRpcResponse::from_value(body)?;

    if let Some(actual) = &response.id
        && actual != expected
    {
        return Err(ProtocolError::IdMismatch {
            expected: expected.clone(),
            actual: actual.clone(),
        }
        .into());
    }

    match response.outcome.into_result() {
        Ok(result) => Ok(Some(result)),
        Err(error) => {
            debug!(id = %expected, code = error.code, "Call resolved to an error");
            Err(RpcError::from(error).into())
        }
    }
}

/// Resolve the answer to a notification: whatever came back is discarded,
/// including bodies that are not JSON at all
pub fn resolve_notification(raw: RawResponse) -> ClientResult<()> {
    match raw.into_json() {
        Ok(None) => {}
        Ok(Some(_)) => debug!("Discarding response body sent for a notification"),
        Err(e) => debug!(error = %e, "Discarding unparseable body sent for a notification"),
    }
    Ok(())
}

/// Resolve the answer to a batch.
///
/// Error entries become `Err` items rather than failing the batch. Entries
/// are matched to calls by id; only when no entry carries an id and the
/// counts agree are they matched by position.
pub fn resolve_batch(sent: &[OutgoingMessage], body: Option<Value>) -> ClientResult<BatchResponse> {
    let Some(body) = body else {
        return Ok(BatchResponse::default());
    };

    let entries = match body {
        Value::Array(entries) => entries,
        other => {
            // A lone object means the server rejected the batch as a whole
            let response = JsonRpcResponse::from_value(other)?;
            return match response.outcome.into_result() {
                Err(error) => Err(RpcError::from(error).into()),
                Ok(_) => Err(ProtocolError::InvalidResponse(
                    "expected an array in answer to a batch".to_string(),
                )
                .into()),
            };
        }
    };

    let responses = entries
        .into_iter()
        .map(JsonRpcResponse::from_value)
        .collect::<Result<Vec<_>, _>>()?;

    let calls: Vec<&RequestId> = sent.iter().filter_map(OutgoingMessage::id).collect();

    let positional = !calls.is_empty()
        && responses.len() == calls.len()
        && responses.iter().all(|response| response.id.is_none());

    if positional {
        debug!(entries = responses.len(), "Correlating batch response by position");
        let items = calls
            .into_iter()
            .zip(responses)
            .map(|(id, response)| BatchItem {
                id: Some(id.clone()),
                outcome: response.outcome.into_result().map_err(RpcError::from),
            })
            .collect();
        return Ok(BatchResponse {
            items,
            missing: Vec::new(),
        });
    }

    let positions: HashMap<&RequestId, usize> = calls
        .iter()
        .enumerate()
        .map(|(index, id)| (*id, index))
        .collect();
    let mut slots: Vec<Option<BatchItem>> = vec![None; calls.len()];
    let mut unattributed = Vec::new();

    for response in responses {
        let outcome = response.outcome.into_result().map_err(RpcError::from);
        let slot = response
            .id
            .as_ref()
            .and_then(|id| positions.get(id).copied())
            .filter(|index| slots[*index].is_none());

        match slot {
            Some(index) => {
                slots[index] = Some(BatchItem {
                    id: response.id,
                    outcome,
                });
            }
            None => {
                if let Some(id) = &response.id {
                    warn!(id = %id, "Batch response entry does not match an outstanding call");
                }
                unattributed.push(BatchItem {
                    id: response.id,
                    outcome,
                });
            }
        }
    }

    let missing: Vec<RequestId> = calls
        .iter()
        .zip(&slots)
        .filter(|(_, slot)| slot.is_none())
        .map(|(id, _)| (*id).clone())
        .collect();
    if !missing.is_empty() {
        warn!(missing = missing.len(), "Batch response is missing answers to some calls");
    }

    let mut items: Vec<BatchItem> = slots.into_iter().flatten().collect();
    items.extend(unattributed);

    Ok(BatchResponse { items, missing })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;
    use repc_json_rpc::{JsonRpcNotification, JsonRpcRequest};
    use serde_json::json;

    #[test]
    fn test_notification_discards_any_body() {
        assert!(resolve_notification(RawResponse::empty()).is_ok());
        assert!(
            resolve_notification(RawResponse::Json(json!({"error": {"code": 1, "message": "x"}})))
                .is_ok()
        );
        assert!(resolve_notification(RawResponse::Text("OK".to_string())).is_ok());
    }

    fn call(id: i64) -> OutgoingMessage {
        JsonRpcRequest::new_no_params(RequestId::Number(id), "m").into()
    }

    fn notification() -> OutgoingMessage {
        JsonRpcNotification::new_no_params("n").into()
    }

    #[test]
    fn test_call_result_extracted() {
        let result = resolve_call(
            &RequestId::Number(1),
            Some(json!({"jsonrpc": "2.0", "result": {"ok": true}, "id": 1})),
        )
        .unwrap();
        assert_eq!(result, Some(json!({"ok": true})));
    }

    #[test]
    fn test_call_without_body_is_no_value() {
        assert_eq!(resolve_call(&RequestId::Number(1), None).unwrap(), None);
    }

    #[test]
    fn test_call_error_raised() {
        let err = resolve_call(
            &RequestId::Number(3),
            Some(json!({
                "jsonrpc": "2.0",
                "error": {"code": -32601, "message": "Method not found", "data": "sum"},
                "id": 3
            })),
        )
        .unwrap_err();

        let rpc = err.as_rpc_error().unwrap();
        assert_eq!(rpc.code, -32601);
        assert_eq!(rpc.message, "Method not found");
        assert_eq!(rpc.data, Some(json!("sum")));
    }

    #[test]
    fn test_call_error_with_null_id_still_raised() {
        let err = resolve_call(
            &RequestId::Number(1),
            Some(json!({"jsonrpc": "2.0", "error": {"code": -32700, "message": "Parse error"}, "id": null})),
        )
        .unwrap_err();
        assert_eq!(err.error_code(), Some(-32700));
    }

    #[test]
    fn test_call_id_mismatch() {
        let err = resolve_call(
            &RequestId::Number(1),
            Some(json!({"jsonrpc": "2.0", "result": 1, "id": 2})),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ClientError::Protocol(ProtocolError::IdMismatch { .. })
        ));
    }

    #[test]
    fn test_call_malformed_responses() {
        let missing_both = resolve_call(&RequestId::Number(1), Some(json!({"id": 1}))).unwrap_err();
        assert!(missing_both.is_protocol_error());

        let array = resolve_call(&RequestId::Number(1), Some(json!([]))).unwrap_err();
        assert!(array.is_protocol_error());
    }

    #[test]
    fn test_batch_mixed_outcome() {
        let sent = vec![call(1), call(2)];
        let batch = resolve_batch(
            &sent,
            Some(json!([
                {"jsonrpc": "2.0", "result": "a", "id": 1},
                {"jsonrpc": "2.0", "error": {"code": 1, "message": "x"}, "id": 2}
            ])),
        )
        .unwrap();

        assert_eq!(
            batch.into_results(),
            vec![Ok(json!("a")), Err(RpcError::new(1, "x", None))]
        );
    }

    #[test]
    fn test_batch_correlates_by_id_not_position() {
        let sent = vec![call(1), notification(), call(2), call(3)];
        let batch = resolve_batch(
            &sent,
            Some(json!([
                {"jsonrpc": "2.0", "result": "three", "id": 3},
                {"jsonrpc": "2.0", "result": "one", "id": 1},
                {"jsonrpc": "2.0", "result": "two", "id": 2}
            ])),
        )
        .unwrap();

        let ids: Vec<_> = batch.iter().map(|item| item.id.clone().unwrap()).collect();
        assert_eq!(
            ids,
            vec![RequestId::Number(1), RequestId::Number(2), RequestId::Number(3)]
        );
        assert_eq!(batch.get(&RequestId::Number(3)), Some(&Ok(json!("three"))));
        assert!(batch.missing.is_empty());
    }

    #[test]
    fn test_batch_positional_fallback_without_ids() {
        let sent = vec![call(10), call(11)];
        let batch = resolve_batch(
            &sent,
            Some(json!([
                {"jsonrpc": "2.0", "result": "first", "id": null},
                {"jsonrpc": "2.0", "error": {"code": -32000, "message": "busy"}, "id": null}
            ])),
        )
        .unwrap();

        assert_eq!(batch.items[0].id, Some(RequestId::Number(10)));
        assert_eq!(batch.items[1].id, Some(RequestId::Number(11)));
        assert_eq!(batch.error_count(), 1);
    }

    #[test]
    fn test_batch_missing_and_unattributed_entries() {
        let sent = vec![call(1), call(2)];
        let batch = resolve_batch(
            &sent,
            Some(json!([
                {"jsonrpc": "2.0", "result": "one", "id": 1},
                {"jsonrpc": "2.0", "error": {"code": -32600, "message": "Invalid Request"}, "id": null}
            ])),
        )
        .unwrap();

        assert_eq!(batch.len(), 2);
        assert_eq!(batch.items[0].outcome, Ok(json!("one")));
        assert!(batch.items[1].id.is_none());
        assert_eq!(batch.missing, vec![RequestId::Number(2)]);
    }

    #[test]
    fn test_batch_without_body_is_empty() {
        let batch = resolve_batch(&[notification(), notification()], None).unwrap();
        assert!(batch.is_empty());
    }

    #[test]
    fn test_batch_rejected_as_a_whole() {
        let err = resolve_batch(
            &[call(1)],
            Some(json!({"jsonrpc": "2.0", "error": {"code": -32600, "message": "Invalid Request"}, "id": null})),
        )
        .unwrap_err();
        assert_eq!(err.error_code(), Some(-32600));

        let err = resolve_batch(&[call(1)], Some(json!({"jsonrpc": "2.0", "result": 1, "id": 1})))
            .unwrap_err();
        assert!(err.is_protocol_error());
    }

    #[test]
    fn test_batch_malformed_entry_fails() {
        let err = resolve_batch(&[call(1)], Some(json!([{"id": 1}]))).unwrap_err();
        assert!(err.is_protocol_error());
    }
}
