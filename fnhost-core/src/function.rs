// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Function shapes accepted by the registry.
//!
//! Each signature kind has an object-safe trait so handlers of different
//! concrete types can live in one registry. Async closures implement the
//! traits directly:
//!
//! ```ignore
//! registry.http("hello", |_req: Request, res: Response| async move {
//!     res.send(200, "text/plain", "hello").await
//! })?;
//! ```

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::cloud_event::CloudEvent;
use crate::error::{HandlerError, InvocationError};
use crate::invocation::{Request, Response};
use crate::types::SignatureType;

/// Handler operating on the raw request/response channel.
#[async_trait]
pub trait HttpFunction: Send + Sync {
    async fn call(&self, request: Request, response: Response) -> Result<(), InvocationError>;
}

#[async_trait]
impl<F, Fut, E> HttpFunction for F
where
    F: Fn(Request, Response) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), E>> + Send + 'static,
    E: Into<HandlerError> + 'static,
{
    async fn call(&self, request: Request, response: Response) -> Result<(), InvocationError> {
        (self)(request, response)
            .await
            .map_err(|e| InvocationError::Handler(e.into()))
    }
}

/// Handler consuming a CloudEvent.
#[async_trait]
pub trait CloudEventFunction: Send + Sync {
    async fn call(&self, event: CloudEvent) -> Result<(), InvocationError>;
}

#[async_trait]
impl<F, Fut, E> CloudEventFunction for F
where
    F: Fn(CloudEvent) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), E>> + Send + 'static,
    E: Into<HandlerError> + 'static,
{
    async fn call(&self, event: CloudEvent) -> Result<(), InvocationError> {
        (self)(event)
            .await
            .map_err(|e| InvocationError::Handler(e.into()))
    }
}

/// Type-erased handler stored in the registry.
#[derive(Clone)]
pub enum UserFunction {
    Http(Arc<dyn HttpFunction>),
    CloudEvent(Arc<dyn CloudEventFunction>),
}

impl fmt::Debug for UserFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(_) => f.write_str("UserFunction::Http(..)"),
            Self::CloudEvent(_) => f.write_str("UserFunction::CloudEvent(..)"),
        }
    }
}

/// Entry in the function registry.
#[derive(Debug, Clone)]
pub struct RegisteredFunction {
    /// Invocation convention the function was registered with.
    pub signature_type: SignatureType,
    /// The handler itself.
    pub user_function: UserFunction,
}

impl RegisteredFunction {
    pub fn new(signature_type: SignatureType, user_function: UserFunction) -> Self {
        Self {
            signature_type,
            user_function,
        }
    }

    /// Run an http or typed function against a request/response pair.
    pub async fn invoke(&self, request: Request, response: Response) -> Result<(), InvocationError> {
        match &self.user_function {
            UserFunction::Http(function) => function.call(request, response).await,
            UserFunction::CloudEvent(_) => Err(InvocationError::SignatureMismatch {
                registered: self.signature_type,
                requested: SignatureType::Http,
            }),
        }
    }

    /// Run an event function.
    pub async fn invoke_event(&self, event: CloudEvent) -> Result<(), InvocationError> {
        match &self.user_function {
            UserFunction::CloudEvent(function) => function.call(event).await,
            UserFunction::Http(_) => Err(InvocationError::SignatureMismatch {
                registered: self.signature_type,
                requested: SignatureType::CloudEvent,
            }),
        }
    }
}
