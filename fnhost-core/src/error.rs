// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Custom error types for fnhost.
//!
//! Every stage of the invocation pipeline has its own error enum so callers
//! can tell a rejected request apart from a failed function.
//! The only boxed error is [`HandlerError`], which carries user code failures
//! through the pipeline untouched.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::SignatureType;

/// Error type returned by user function code.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Top-level error type for the fnhost runtime.
#[derive(Debug, Error)]
pub enum FnHostError {
    // =========================================================================
    // Configuration Errors - Fail-Fast on Invalid Config
    // =========================================================================
    #[error("Hard validation error: {0}")]
    HardValidation(#[from] HardValidationError),

    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    #[error("Configuration parse error: {message}")]
    ConfigParse { message: String },

    // =========================================================================
    // Registry Errors
    // =========================================================================
    #[error(transparent)]
    InvalidName(#[from] InvalidNameError),

    #[error("Function not found: {0}")]
    FunctionNotFound(String),

    // =========================================================================
    // Invocation Errors
    // =========================================================================
    #[error(transparent)]
    Invocation(#[from] InvocationError),

    // =========================================================================
    // System Errors
    // =========================================================================
    #[error("IO error: {context} - {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
}

/// Raised by registration when a function name breaks the naming rules.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid function name: {name:?} - must start with a letter, end with a letter or digit, contain only letters, digits, '-' or '_', and be at most 63 characters")]
pub struct InvalidNameError {
    pub name: String,
}

/// Hard validation errors stop the host before it starts serving.
#[derive(Debug, Error)]
pub enum HardValidationError {
    #[error("Invalid field value: {field} = {value} - {reason}")]
    InvalidFieldValue {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("Invalid port: {port} - {reason}")]
    InvalidPort { port: u16, reason: String },

    #[error("Unknown signature type: {value} (expected http, cloudevent or typed)")]
    UnknownSignatureType { value: String },
}

/// Failures while turning a raw request into a typed value.
///
/// Always recovered by the typed dispatcher and answered with a 400.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("request is not valid JSON or content type is wrong")]
    NotJson,

    #[error("request body does not match the expected shape: {0}")]
    Shape(#[source] serde_json::Error),

    #[error("request could not be decoded: {message}")]
    Invalid { message: String },
}

/// Failures while writing a typed value onto the response.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("cannot serialize response value: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("cannot encode response value: {message}")]
    Invalid { message: String },

    #[error(transparent)]
    Response(#[from] ResponseError),
}

/// Misuse of the response channel.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResponseError {
    #[error("response has already been ended")]
    AlreadyEnded,
}

/// Failures surfaced to the invoking runtime.
///
/// The runtime is expected to answer any of these with a 500-class response.
#[derive(Debug, Error)]
pub enum InvocationError {
    #[error("function failed: {0}")]
    Handler(#[source] HandlerError),

    #[error("function response could not be encoded: {0}")]
    Encode(#[from] EncodeError),

    #[error("function is registered as {registered}, cannot be invoked as {requested}")]
    SignatureMismatch {
        registered: SignatureType,
        requested: SignatureType,
    },
}

/// CloudEvent parsing errors.
#[derive(Debug, Error)]
pub enum CloudEventError {
    #[error("missing required CloudEvent attribute: {0}")]
    MissingAttribute(&'static str),

    #[error("unsupported CloudEvent spec version: {0}")]
    UnsupportedSpecVersion(String),

    #[error("structured CloudEvent body is not a JSON object")]
    NotStructured,

    #[error("malformed CloudEvent: {0}")]
    Malformed(#[source] serde_json::Error),
}

/// Result type alias using FnHostError.
pub type FnHostResult<T> = Result<T, FnHostError>;
