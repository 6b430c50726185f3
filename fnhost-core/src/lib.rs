//! fnhost Core Library
//!
//! Function registry and invocation pipeline for the fnhost serverless host.
//! Provides name validation, the registration container, the raw
//! request/response channel, pluggable invocation formats, the typed
//! dispatcher, CloudEvent parsing and host configuration.

pub mod cloud_event;
pub mod config;
pub mod error;
pub mod format;
pub mod function;
pub mod invocation;
pub mod registry;
pub mod typed;
pub mod types;

// Re-export commonly used types
pub use cloud_event::CloudEvent;
pub use config::{ConfigLoader, HostConfig};
pub use error::{
    CloudEventError, DecodeError, EncodeError, FnHostError, FnHostResult, HandlerError,
    HardValidationError, InvalidNameError, InvocationError, ResponseError,
};
pub use format::{InvocationFormat, JsonFormat};
pub use function::{CloudEventFunction, HttpFunction, RegisteredFunction, UserFunction};
pub use invocation::{Body, Request, Response, ResponseParts};
pub use registry::FunctionRegistry;
pub use typed::{TypedDispatcher, TypedFunction, TypedOptions};
pub use types::{is_valid_name, FunctionName, Port, SignatureType};
