// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Raw request/response channel seen by registered functions.
//!
//! The invoking runtime owns the wire protocol. It hands functions a
//! [`Request`] whose body has already been parsed, and a [`Response`] handle
//! that functions write into. The runtime keeps a clone of the handle and
//! reads the result back with [`Response::snapshot`] once the function returns.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::Mutex;

use crate::error::ResponseError;

/// Request body as prepared by the surrounding HTTP layer.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Body {
    /// No body was sent.
    #[default]
    Empty,
    /// Textual body that was not parsed further.
    Text(String),
    /// Opaque binary body.
    Bytes(Vec<u8>),
    /// Body parsed as JSON upstream.
    Json(Value),
}

impl Body {
    /// Get the body as a structured JSON value (object or array).
    ///
    /// Primitives parsed from JSON do not count as structured.
    pub fn as_structured(&self) -> Option<&Value> {
        match self {
            Self::Json(value @ (Value::Object(_) | Value::Array(_))) => Some(value),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(text) => text.is_empty(),
            Self::Bytes(bytes) => bytes.is_empty(),
            Self::Json(_) => false,
        }
    }
}

/// Incoming request handed to a function.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    method: String,
    path: String,
    /// Header names are stored lower-cased.
    headers: BTreeMap<String, String>,
    body: Body,
}

impl Request {
    /// Create a request with no headers and an empty body.
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            headers: BTreeMap::new(),
            body: Body::Empty,
        }
    }

    /// Add a header. Names are case-insensitive.
    ///
    /// Repeated headers are combined into one comma-separated value.
    pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        let value = value.into();
        self.headers
            .entry(name.as_ref().to_ascii_lowercase())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert_with(|| value.clone());
        self
    }

    pub fn with_body(mut self, body: Body) -> Self {
        self.body = body;
        self
    }

    /// POST request carrying an already-parsed JSON body.
    pub fn json(path: impl Into<String>, value: Value) -> Self {
        Self::new("POST", path)
            .with_header("content-type", "application/json")
            .with_body(Body::Json(value))
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Look up a header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn headers(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Media type of the body without parameters, lower-cased.
    pub fn content_type(&self) -> Option<String> {
        self.header("content-type").map(|value| {
            value
                .split(';')
                .next()
                .unwrap_or_default()
                .trim()
                .to_ascii_lowercase()
        })
    }

    pub fn body(&self) -> &Body {
        &self.body
    }
}

/// Everything a function wrote to its response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseParts {
    pub status: u16,
    /// Header names are stored lower-cased.
    pub headers: BTreeMap<String, String>,
    pub body: Vec<u8>,
    pub ended: bool,
}

impl Default for ResponseParts {
    fn default() -> Self {
        Self {
            status: 200,
            headers: BTreeMap::new(),
            body: Vec::new(),
            ended: false,
        }
    }
}

impl ResponseParts {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

/// Outgoing response channel.
///
/// Cloning yields another handle to the same response.
#[derive(Debug, Clone, Default)]
pub struct Response {
    inner: Arc<Mutex<ResponseParts>>,
}

impl Response {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the status code. Fails once the response has ended.
    pub async fn set_status(&self, status: u16) -> Result<(), ResponseError> {
        let mut parts = self.inner.lock().await;
        if parts.ended {
            return Err(ResponseError::AlreadyEnded);
        }
        parts.status = status;
        Ok(())
    }

    /// Set a header, replacing any previous value. Fails once the response has ended.
    pub async fn set_header(
        &self,
        name: impl AsRef<str>,
        value: impl Into<String>,
    ) -> Result<(), ResponseError> {
        let mut parts = self.inner.lock().await;
        if parts.ended {
            return Err(ResponseError::AlreadyEnded);
        }
        parts
            .headers
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
        Ok(())
    }

    /// Write the complete body and terminate the response.
    pub async fn end(&self, body: impl Into<Vec<u8>>) -> Result<(), ResponseError> {
        let mut parts = self.inner.lock().await;
        if parts.ended {
            return Err(ResponseError::AlreadyEnded);
        }
        parts.body = body.into();
        parts.ended = true;
        Ok(())
    }

    /// Set status and content type, then end with `body`.
    pub async fn send(
        &self,
        status: u16,
        content_type: &str,
        body: impl Into<Vec<u8>>,
    ) -> Result<(), ResponseError> {
        let mut parts = self.inner.lock().await;
        if parts.ended {
            return Err(ResponseError::AlreadyEnded);
        }
        parts.status = status;
        parts
            .headers
            .insert("content-type".to_string(), content_type.to_string());
        parts.body = body.into();
        parts.ended = true;
        Ok(())
    }

    pub async fn is_ended(&self) -> bool {
        self.inner.lock().await.ended
    }

    /// Copy out the current state of the response.
    pub async fn snapshot(&self) -> ResponseParts {
        self.inner.lock().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_body_structured() {
        assert!(Body::Json(json!({"x": 1})).as_structured().is_some());
        assert!(Body::Json(json!([1, 2])).as_structured().is_some());
        assert!(Body::Json(json!("text")).as_structured().is_none());
        assert!(Body::Json(json!(3)).as_structured().is_none());
        assert!(Body::Text("{\"x\":1}".into()).as_structured().is_none());
        assert!(Body::Empty.as_structured().is_none());
    }

    #[test]
    fn test_request_headers_case_insensitive() {
        let req = Request::new("GET", "/")
            .with_header("Content-Type", "application/json; charset=utf-8");
        assert_eq!(
            req.header("content-type"),
            Some("application/json; charset=utf-8")
        );
        assert_eq!(req.content_type().as_deref(), Some("application/json"));
        assert_eq!(req.header("x-missing"), None);
    }

    #[test]
    fn test_repeated_headers_combined() {
        let req = Request::new("GET", "/")
            .with_header("X-Forwarded-For", "10.0.0.1")
            .with_header("accept", "text/plain")
            .with_header("x-forwarded-for", "10.0.0.2");

        assert_eq!(req.header("x-forwarded-for"), Some("10.0.0.1, 10.0.0.2"));
        let headers: Vec<_> = req.headers().collect();
        assert_eq!(
            headers,
            vec![
                ("accept", "text/plain"),
                ("x-forwarded-for", "10.0.0.1, 10.0.0.2")
            ]
        );
    }

    #[test]
    fn test_body_is_empty() {
        assert!(Body::Empty.is_empty());
        assert!(Body::Text(String::new()).is_empty());
        assert!(Body::Bytes(Vec::new()).is_empty());
        assert!(!Body::Json(json!({})).is_empty());
        assert!(!Body::Text("x".into()).is_empty());
    }

    #[tokio::test]
    async fn test_response_end_once() {
        let res = Response::new();
        res.set_status(201).await.unwrap();
        res.set_header("X-Trace", "abc").await.unwrap();
        res.end("done").await.unwrap();

        assert_eq!(res.end("again").await, Err(ResponseError::AlreadyEnded));
        assert_eq!(res.set_status(500).await, Err(ResponseError::AlreadyEnded));

        let parts = res.snapshot().await;
        assert_eq!(parts.status, 201);
        assert_eq!(parts.header("x-trace"), Some("abc"));
        assert_eq!(parts.body, b"done");
        assert!(parts.ended);
    }

    #[tokio::test]
    async fn test_response_clones_share_state() {
        let res = Response::new();
        let handle = res.clone();
        handle.send(404, "text/plain", "missing").await.unwrap();

        assert!(res.is_ended().await);
        let parts = res.snapshot().await;
        assert_eq!(parts.status, 404);
        assert_eq!(parts.header("content-type"), Some("text/plain"));
    }
}
