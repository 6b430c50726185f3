// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! CloudEvents 1.0 envelope for event-style functions.
//!
//! Supports the two HTTP content modes:
//! - structured: `content-type: application/cloudevents+json`, attributes in the body
//! - binary: attributes in `ce-*` headers, the body is the event data

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CloudEventError;
use crate::invocation::{Body, Request};

/// Spec version accepted by this host.
pub const SPEC_VERSION: &str = "1.0";

const STRUCTURED_CONTENT_TYPE: &str = "application/cloudevents+json";

/// A single CloudEvent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloudEvent {
    pub id: String,
    pub source: String,
    pub specversion: String,
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datacontenttype: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl CloudEvent {
    /// Create an event with the required attributes set.
    pub fn new(
        id: impl Into<String>,
        source: impl Into<String>,
        event_type: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            specversion: SPEC_VERSION.to_string(),
            event_type: event_type.into(),
            datacontenttype: None,
            subject: None,
            time: None,
            data: None,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Extract an event from a request in structured or binary mode.
    pub fn from_request(request: &Request) -> Result<Self, CloudEventError> {
        let event = if request.content_type().as_deref() == Some(STRUCTURED_CONTENT_TYPE) {
            Self::from_structured(request.body())?
        } else {
            Self::from_binary(request)?
        };

        if event.specversion != SPEC_VERSION {
            return Err(CloudEventError::UnsupportedSpecVersion(event.specversion));
        }
        Ok(event)
    }

    fn from_structured(body: &Body) -> Result<Self, CloudEventError> {
        let value = match body {
            Body::Json(value @ Value::Object(_)) => value.clone(),
            Body::Text(text) => serde_json::from_str(text).map_err(CloudEventError::Malformed)?,
            Body::Bytes(bytes) => {
                serde_json::from_slice(bytes).map_err(CloudEventError::Malformed)?
            }
            _ => return Err(CloudEventError::NotStructured),
        };

        if !value.is_object() {
            return Err(CloudEventError::NotStructured);
        }
        for attribute in ["id", "source", "specversion", "type"] {
            if value.get(attribute).is_none() {
                return Err(CloudEventError::MissingAttribute(attribute));
            }
        }

        serde_json::from_value(value).map_err(CloudEventError::Malformed)
    }

    fn from_binary(request: &Request) -> Result<Self, CloudEventError> {
        let required = |attribute: &'static str| {
            request
                .header(&format!("ce-{attribute}"))
                .map(str::to_string)
                .ok_or(CloudEventError::MissingAttribute(attribute))
        };
        let optional = |attribute: &str| request.header(&format!("ce-{attribute}")).map(str::to_string);

        let data = match request.body() {
            Body::Empty => None,
            Body::Json(value) => Some(value.clone()),
            Body::Text(text) => Some(Value::String(text.clone())),
            Body::Bytes(bytes) => Some(Value::String(String::from_utf8_lossy(bytes).into_owned())),
        };

        Ok(Self {
            id: required("id")?,
            source: required("source")?,
            specversion: required("specversion")?,
            event_type: required("type")?,
            datacontenttype: request.header("content-type").map(str::to_string),
            subject: optional("subject"),
            time: optional("time"),
            data,
        })
    }
}
