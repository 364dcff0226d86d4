use serde::{Deserialize, Serialize};

use crate::notification::JsonRpcNotification;
use crate::request::{JsonRpcRequest, RequestParams};
use crate::types::RequestId;

/// One request object on the wire, either a call or a notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OutgoingMessage {
    /// Carries an id and expects a response
    Call(JsonRpcRequest),
    /// Carries no id and expects nothing back
    Notification(JsonRpcNotification),
}

impl OutgoingMessage {
    pub fn method(&self) -> &str {
        match self {
            OutgoingMessage::Call(request) => &request.method,
            OutgoingMessage::Notification(notification) => &notification.method,
        }
    }

    pub fn params(&self) -> &RequestParams {
        match self {
            OutgoingMessage::Call(request) => &request.params,
            OutgoingMessage::Notification(notification) => &notification.params,
        }
    }

    /// The correlation id, `None` for notifications
    pub fn id(&self) -> Option<&RequestId> {
        match self {
            OutgoingMessage::Call(request) => Some(&request.id),
            OutgoingMessage::Notification(_) => None,
        }
    }

    pub fn is_notification(&self) -> bool {
        matches!(self, OutgoingMessage::Notification(_))
    }
}

impl From<JsonRpcRequest> for OutgoingMessage {
    fn from(request: JsonRpcRequest) -> Self {
        Self::Call(request)
    }
}

impl From<JsonRpcNotification> for OutgoingMessage {
    fn from(notification: JsonRpcNotification) -> Self {
        Self::Notification(notification)
    }
}

/// Everything handed to a transport in a single delivery
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Payload {
    Single(OutgoingMessage),
    /// Serialized as a JSON array of request objects
    Batch(Vec<OutgoingMessage>),
}

impl Payload {
    pub fn is_batch(&self) -> bool {
        matches!(self, Payload::Batch(_))
    }

    /// Every message in the payload, in request order
    pub fn messages(&self) -> &[OutgoingMessage] {
        match self {
            Payload::Single(message) => std::slice::from_ref(message),
            Payload::Batch(messages) => messages,
        }
    }

    /// Ids of every call in the payload, in request order
    pub fn call_ids(&self) -> Vec<&RequestId> {
        self.messages().iter().filter_map(|m| m.id()).collect()
    }

    pub fn to_value(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}

impl From<OutgoingMessage> for Payload {
    fn from(message: OutgoingMessage) -> Self {
        Self::Single(message)
    }
}

impl From<Vec<OutgoingMessage>> for Payload {
    fn from(messages: Vec<OutgoingMessage>) -> Self {
        Self::Batch(messages)
    }
}
