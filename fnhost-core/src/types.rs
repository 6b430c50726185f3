// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Newtype wrappers for validated inputs.
//!
//! Following the "Newtype" pattern in Rust to ensure valid state by construction.
//! All types validate their invariants at creation time.

use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{HardValidationError, InvalidNameError};

/// Maximum length of a function name.
pub const MAX_FUNCTION_NAME_LEN: usize = 63;

/// Check a function name against the naming rules.
///
/// A valid name starts with an ASCII letter, ends with an ASCII letter or
/// digit, is at most 63 characters long and contains only letters, digits,
/// `-` and `_`.
pub fn is_valid_name(name: &str) -> bool {
    let bytes = name.as_bytes();

    let (first, last) = match (bytes.first(), bytes.last()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => return false,
    };

    bytes.len() <= MAX_FUNCTION_NAME_LEN
        && first.is_ascii_alphabetic()
        && last.is_ascii_alphanumeric()
        && bytes
            .iter()
            .all(|b| b.is_ascii_alphanumeric() || *b == b'-' || *b == b'_')
}

/// Validated function name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FunctionName(String);

impl FunctionName {
    /// Create a new FunctionName with validation.
    pub fn new(name: impl Into<String>) -> Result<Self, InvalidNameError> {
        let name = name.into();
        if !is_valid_name(&name) {
            return Err(InvalidNameError { name });
        }
        Ok(Self(name))
    }

    /// Get the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FunctionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for FunctionName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for FunctionName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for FunctionName {
    type Error = InvalidNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for FunctionName {
    type Error = InvalidNameError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<FunctionName> for String {
    fn from(name: FunctionName) -> Self {
        name.0
    }
}

/// Invocation convention of a registered function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignatureType {
    /// Raw request/response handler.
    Http,
    /// CloudEvent consumer.
    #[serde(alias = "event")]
    CloudEvent,
    /// Typed handler bridged through an invocation format.
    Typed,
}

impl SignatureType {
    /// Get the signature name as used in configuration.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::CloudEvent => "cloudevent",
            Self::Typed => "typed",
        }
    }
}

impl fmt::Display for SignatureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for SignatureType {
    type Err = HardValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "http" => Ok(Self::Http),
            "cloudevent" | "event" => Ok(Self::CloudEvent),
            "typed" => Ok(Self::Typed),
            other => Err(HardValidationError::UnknownSignatureType {
                value: other.to_string(),
            }),
        }
    }
}

/// Validated network port.
/// Must be in range 1-65535 (0 is reserved).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct Port(u16);

impl Port {
    /// Create a new Port with validation.
    pub fn new(port: u16) -> Result<Self, HardValidationError> {
        if port == 0 {
            return Err(HardValidationError::InvalidPort {
                port,
                reason: "Port 0 is reserved and cannot be used".to_string(),
            });
        }
        Ok(Self(port))
    }

    /// Create without validation (for trusted constants).
    pub(crate) const fn new_unchecked(port: u16) -> Self {
        Self(port)
    }

    /// Get the inner port value.
    pub fn value(&self) -> u16 {
        self.0
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u16> for Port {
    type Error = HardValidationError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Port> for u16 {
    fn from(port: Port) -> Self {
        port.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_function_name_valid() {
        assert!(is_valid_name("a"));
        assert!(is_valid_name("Z9"));
        assert!(is_valid_name("my-function"));
        assert!(is_valid_name("function_123"));
        assert!(is_valid_name("a-_-b"));
        assert!(is_valid_name(&format!("a{}", "b".repeat(62))));
        assert!(FunctionName::new("MyFunc").is_ok());
    }

    #[test]
    fn test_function_name_invalid() {
        assert!(!is_valid_name(""));
        assert!(!is_valid_name("1func"));
        assert!(!is_valid_name("-func"));
        assert!(!is_valid_name("_func"));
        assert!(!is_valid_name("func name"));
        assert!(!is_valid_name("func-"));
        assert!(!is_valid_name("func_"));
        assert!(!is_valid_name("func@name"));
        assert!(!is_valid_name("fünc"));
        assert!(!is_valid_name(&"a".repeat(64)));
        assert!(FunctionName::new("func.name").is_err());
    }

    #[test]
    fn test_function_name_error_carries_input() {
        let err = FunctionName::new("bad name").unwrap_err();
        assert_eq!(err.name, "bad name");
    }

    #[test]
    fn test_function_name_serde() {
        let name: FunctionName = serde_json::from_str("\"hello\"").unwrap();
        assert_eq!(name.as_str(), "hello");
        assert!(serde_json::from_str::<FunctionName>("\"9\"").is_err());
    }

    #[test]
    fn test_signature_type_parse() {
        assert_eq!("http".parse::<SignatureType>().unwrap(), SignatureType::Http);
        assert_eq!(
            "event".parse::<SignatureType>().unwrap(),
            SignatureType::CloudEvent
        );
        assert_eq!(
            "cloudevent".parse::<SignatureType>().unwrap(),
            SignatureType::CloudEvent
        );
        assert_eq!(
            "typed".parse::<SignatureType>().unwrap(),
            SignatureType::Typed
        );
        assert!("rpc".parse::<SignatureType>().is_err());
    }

    #[test]
    fn test_port_invalid() {
        assert!(Port::new(0).is_err());
        assert!(Port::new(8080).is_ok());
    }
}
