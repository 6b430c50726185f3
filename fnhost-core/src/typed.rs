// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Typed functions and the dispatcher that adapts them to the raw channel.
//!
//! A typed function maps an input value to an output value. The
//! [`TypedDispatcher`] wraps it into an [`HttpFunction`] that runs
//! `decode → handler → encode`, each step awaited before the next one starts.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{EncodeError, HandlerError, InvocationError};
use crate::format::{InvocationFormat, JsonFormat};
use crate::function::HttpFunction;
use crate::invocation::{Request, Response};

/// Status written when a request cannot be decoded.
pub const BAD_REQUEST_STATUS: u16 = 400;
/// Body written when a request cannot be decoded.
pub const BAD_REQUEST_BODY: &str = "400 Bad Request";

/// User handler from a typed input to a typed output.
#[async_trait]
pub trait TypedFunction<I, O>: Send + Sync {
    async fn call(&self, input: I) -> Result<O, HandlerError>;
}

#[async_trait]
impl<I, O, F, Fut, E> TypedFunction<I, O> for F
where
    F: Fn(I) -> Fut + Send + Sync,
    Fut: Future<Output = Result<O, E>> + Send + 'static,
    E: Into<HandlerError> + 'static,
    I: Send + 'static,
    O: Send + 'static,
{
    async fn call(&self, input: I) -> Result<O, HandlerError> {
        (self)(input).await.map_err(Into::into)
    }
}

/// Registration options for a typed function.
pub struct TypedOptions<I, O> {
    handler: Arc<dyn TypedFunction<I, O>>,
    format: Arc<dyn InvocationFormat<I, O>>,
}

impl<I, O> TypedOptions<I, O>
where
    I: DeserializeOwned + Send + 'static,
    O: Serialize + Send + 'static,
{
    /// Options using the default [`JsonFormat`].
    pub fn new(handler: impl TypedFunction<I, O> + 'static) -> Self {
        Self::with_format(handler, JsonFormat)
    }
}

impl<I, O> TypedOptions<I, O> {
    /// Options with an explicit format; `I` and `O` need not be serde types.
    pub fn with_format(
        handler: impl TypedFunction<I, O> + 'static,
        format: impl InvocationFormat<I, O> + 'static,
    ) -> Self {
        Self {
            handler: Arc::new(handler),
            format: Arc::new(format),
        }
    }

    /// Replace the format.
    pub fn format(mut self, format: impl InvocationFormat<I, O> + 'static) -> Self {
        self.format = Arc::new(format);
        self
    }
}

/// Adapts a typed function into a raw request/response handler.
pub struct TypedDispatcher<I, O> {
    handler: Arc<dyn TypedFunction<I, O>>,
    format: Arc<dyn InvocationFormat<I, O>>,
}

impl<I, O> TypedDispatcher<I, O> {
    pub fn new(options: TypedOptions<I, O>) -> Self {
        Self {
            handler: options.handler,
            format: options.format,
        }
    }
}

impl<I, O> From<TypedOptions<I, O>> for TypedDispatcher<I, O> {
    fn from(options: TypedOptions<I, O>) -> Self {
        Self::new(options)
    }
}

#[async_trait]
impl<I, O> HttpFunction for TypedDispatcher<I, O>
where
    I: Send + 'static,
    O: Send + 'static,
{
    async fn call(&self, request: Request, response: Response) -> Result<(), InvocationError> {
        let input = match self.format.decode(&request).await {
            Ok(input) => input,
            Err(e) => {
                tracing::debug!(
                    method = request.method(),
                    path = request.path(),
                    error = %e,
                    "Rejecting undecodable request"
                );
                response
                    .send(BAD_REQUEST_STATUS, "text/plain", BAD_REQUEST_BODY)
                    .await
                    .map_err(EncodeError::from)?;
                return Ok(());
            }
        };

        let output = self
            .handler
            .call(input)
            .await
            .map_err(InvocationError::Handler)?;

        self.format.encode(&response, output).await?;
        Ok(())
    }
}
