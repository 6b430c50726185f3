// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Invocation formats bridge the raw channel and typed function values.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{DecodeError, EncodeError};
use crate::invocation::{Request, Response};

/// Content type written by [`JsonFormat`].
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Decode/encode strategy used by typed functions.
///
/// `decode` failures are answered with a 400 by the dispatcher, so an
/// implementation should only fail there for problems with the request.
/// `encode` must set a content type, write the body and end the response.
#[async_trait]
pub trait InvocationFormat<I, O>: Send + Sync {
    async fn decode(&self, request: &Request) -> Result<I, DecodeError>;

    async fn encode(&self, response: &Response, value: O) -> Result<(), EncodeError>;
}

/// Default format: JSON request body in, JSON response body out.
///
/// The body must already be parsed into a JSON object or array by the HTTP
/// layer. Beyond what `I`'s `Deserialize` impl checks, no validation happens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JsonFormat;

#[async_trait]
impl<I, O> InvocationFormat<I, O> for JsonFormat
where
    I: DeserializeOwned + Send + 'static,
    O: Serialize + Send + 'static,
{
    async fn decode(&self, request: &Request) -> Result<I, DecodeError> {
        let value = request.body().as_structured().ok_or(DecodeError::NotJson)?;
        <I as Deserialize<'_>>::deserialize(value).map_err(DecodeError::Shape)
    }

    async fn encode(&self, response: &Response, value: O) -> Result<(), EncodeError> {
        let body = serde_json::to_vec(&value).map_err(EncodeError::Serialize)?;
        response.set_header("content-type", JSON_CONTENT_TYPE).await?;
        response.end(body).await?;
        Ok(())
    }
}
