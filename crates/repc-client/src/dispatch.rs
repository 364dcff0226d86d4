//! Alternative call styles layered over a [`Session`]

use serde::Serialize;
use serde_json::Value;

use crate::error::ClientResult;
use crate::options::CallOptions;
use crate::session::Session;

/// Flat call style: the method name is an argument
#[derive(Clone, Debug)]
pub struct FlatClient {
    session: Session,
}

impl FlatClient {
    pub fn new(session: Session) -> Self {
        Self { session }
    }

    pub async fn invoke<P: Serialize>(&self, method: &str, params: P) -> ClientResult<Option<Value>> {
        self.session.call(method, params).await
    }

    pub async fn invoke_with<P: Serialize>(
        &self,
        method: &str,
        params: P,
        options: &CallOptions,
    ) -> ClientResult<Option<Value>> {
        self.session.call_with(method, params, options).await
    }

    /// Handle bound to one method name
    pub fn method(&self, name: impl Into<String>) -> MethodHandle {
        MethodHandle {
            session: self.session.clone(),
            method: name.into(),
        }
    }
}

/// A method name bound to a session
#[derive(Clone, Debug)]
pub struct MethodHandle {
    session: Session,
    method: String,
}

impl MethodHandle {
    pub fn name(&self) -> &str {
        &self.method
    }

    pub async fn call<P: Serialize>(&self, params: P) -> ClientResult<Option<Value>> {
        self.session.call(&self.method, params).await
    }

    pub async fn call_with<P: Serialize>(
        &self,
        params: P,
        options: &CallOptions,
    ) -> ClientResult<Option<Value>> {
        self.session.call_with(&self.method, params, options).await
    }

    pub async fn notify<P: Serialize>(&self, params: P) -> ClientResult<()> {
        self.session.notify(&self.method, params).await
    }
}

/// Positional call style: arguments become the params array.
///
/// Options are fixed when the client is created and apply to every call.
#[derive(Clone, Debug)]
pub struct PositionalClient {
    session: Session,
    options: CallOptions,
}

impl PositionalClient {
    pub fn new(session: Session, options: CallOptions) -> Self {
        Self { session, options }
    }

    pub fn options(&self) -> &CallOptions {
        &self.options
    }

    pub async fn invoke<I>(&self, method: &str, args: I) -> ClientResult<Option<Value>>
    where
        I: IntoIterator<Item = Value>,
    {
        let args: Vec<Value> = args.into_iter().collect();
        self.session.call_with(method, args, &self.options).await
    }
}
