// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Functions bundled with the host binary.
//!
//! One function per signature kind, plus a typed function with a custom format.

use async_trait::async_trait;
use fnhost_core::{
    Body, CloudEvent, DecodeError, EncodeError, FunctionRegistry, HandlerError, InvalidNameError,
    InvocationFormat, Request, Response, TypedOptions,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct AddOneInput {
    pub x: i64,
}

#[derive(Debug, Serialize)]
pub struct AddOneOutput {
    pub y: i64,
}

/// Plain-text format: text body in, text body out.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextFormat;

#[async_trait]
impl InvocationFormat<String, String> for TextFormat {
    async fn decode(&self, request: &Request) -> Result<String, DecodeError> {
        match request.body() {
            Body::Text(text) => Ok(text.clone()),
            Body::Bytes(bytes) => String::from_utf8(bytes.clone()).map_err(|e| DecodeError::Invalid {
                message: e.to_string(),
            }),
            _ => Err(DecodeError::Invalid {
                message: "expected a text body".to_string(),
            }),
        }
    }

    async fn encode(&self, response: &Response, value: String) -> Result<(), EncodeError> {
        response
            .set_header("content-type", "text/plain; charset=utf-8")
            .await?;
        response.end(value).await?;
        Ok(())
    }
}

async fn hello(request: Request, response: Response) -> Result<(), HandlerError> {
    let name = request
        .body()
        .as_structured()
        .and_then(|body| body.get("name"))
        .and_then(|name| name.as_str())
        .unwrap_or("World")
        .to_string();

    response
        .send(200, "text/plain; charset=utf-8", format!("Hello, {}!", name))
        .await?;
    Ok(())
}

async fn log_event(event: CloudEvent) -> Result<(), HandlerError> {
    tracing::info!(
        id = %event.id,
        source = %event.source,
        event_type = %event.event_type,
        has_data = event.data.is_some(),
        "Received event"
    );
    Ok(())
}

async fn add_one(input: AddOneInput) -> Result<AddOneOutput, HandlerError> {
    let y = input.x.checked_add(1).ok_or("x + 1 overflows")?;
    Ok(AddOneOutput { y })
}

async fn shout(input: String) -> Result<String, HandlerError> {
    Ok(input.to_uppercase())
}

/// Register every bundled function.
pub fn register_all(registry: &FunctionRegistry) -> Result<(), InvalidNameError> {
    registry.http("hello", hello)?;
    registry.cloud_event("log-event", log_event)?;
    registry.typed("add-one", add_one)?;
    registry.typed_with("shout", TypedOptions::with_format(shout, TextFormat))?;
    Ok(())
}
