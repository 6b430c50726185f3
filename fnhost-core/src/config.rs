// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! YAML host configuration with strict validation.
//!
//! Validates host settings at boot-up time.
//! Any invalid field results in a HardValidationError that prevents startup.

use std::path::Path;

use serde::Deserialize;

use crate::error::{FnHostError, FnHostResult, HardValidationError};
use crate::types::{FunctionName, Port, SignatureType};

/// Port used when neither the file nor the command line sets one.
pub const DEFAULT_PORT: u16 = 8080;

/// Raw host configuration as parsed from YAML (before validation).
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawHostConfig {
    #[serde(default = "default_port")]
    port: u16,
    #[serde(default)]
    target: Option<String>,
    #[serde(default)]
    signature_type: Option<String>,
    #[serde(default)]
    metrics_port: Option<u16>,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

impl Default for RawHostConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            target: None,
            signature_type: None,
            metrics_port: None,
        }
    }
}

/// Raw root configuration file.
#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(default)]
    host: RawHostConfig,
}

/// Validated host configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostConfig {
    /// Port the HTTP server listens on.
    pub port: Port,
    /// Function served at every path outside `/function/{name}`.
    pub target: Option<FunctionName>,
    /// Expected signature of the target function.
    pub signature_type: Option<SignatureType>,
    /// Port of the Prometheus endpoint, disabled when `None`.
    pub metrics_port: Option<Port>,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            port: Port::new_unchecked(DEFAULT_PORT),
            target: None,
            signature_type: None,
            metrics_port: None,
        }
    }
}

impl HostConfig {
    /// Check constraints that span several fields.
    ///
    /// Runs again whenever fields are overridden after loading.
    pub fn validate(&self) -> Result<(), HardValidationError> {
        if self.metrics_port == Some(self.port) {
            return Err(HardValidationError::InvalidPort {
                port: self.port.value(),
                reason: "Metrics port must differ from the server port".to_string(),
            });
        }
        Ok(())
    }
}

/// Configuration loader with strict validation.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load and validate configuration from a YAML file.
    pub fn load_file(path: impl AsRef<Path>) -> FnHostResult<HostConfig> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(FnHostError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| FnHostError::Io {
            context: "reading config file",
            source: e,
        })?;

        Self::load_string(&content)
    }

    /// Load and validate configuration from a YAML string.
    ///
    /// An empty document yields the defaults.
    pub fn load_string(content: &str) -> FnHostResult<HostConfig> {
        if content.trim().is_empty() {
            return Ok(HostConfig::default());
        }

        let raw: RawConfig =
            serde_yaml::from_str(content).map_err(|e| FnHostError::ConfigParse {
                message: format!("YAML parse error: {}", e),
            })?;

        Ok(Self::validate(raw.host)?)
    }

    /// Validate raw configuration and convert to validated types.
    fn validate(raw: RawHostConfig) -> Result<HostConfig, HardValidationError> {
        let port = Port::new(raw.port)?;

        let target = raw
            .target
            .map(|name| {
                FunctionName::new(name).map_err(|e| HardValidationError::InvalidFieldValue {
                    field: "target",
                    value: e.name.clone(),
                    reason: e.to_string(),
                })
            })
            .transpose()?;

        let signature_type = raw
            .signature_type
            .as_deref()
            .map(str::parse::<SignatureType>)
            .transpose()?;

        let metrics_port = raw.metrics_port.map(Port::new).transpose()?;

        let config = HostConfig {
            port,
            target,
            signature_type,
            metrics_port,
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_CONFIG: &str = r#"
host:
  port: 9000
  target: add-one
  signature_type: typed
  metrics_port: 9090
"#;

    #[test]
    fn test_valid_config() {
        let config = ConfigLoader::load_string(VALID_CONFIG).unwrap();
        assert_eq!(config.port.value(), 9000);
        assert_eq!(config.target.as_ref().map(|t| t.as_str()), Some("add-one"));
        assert_eq!(config.signature_type, Some(SignatureType::Typed));
        assert_eq!(config.metrics_port.map(|p| p.value()), Some(9090));
    }

    #[test]
    fn test_defaults_applied() {
        let config = ConfigLoader::load_string("host: {}").unwrap();
        assert_eq!(config, HostConfig::default());
        assert_eq!(config.port.value(), DEFAULT_PORT);

        assert_eq!(ConfigLoader::load_string("").unwrap(), HostConfig::default());
    }

    #[test]
    fn test_invalid_port_zero() {
        let result = ConfigLoader::load_string("host:\n  port: 0\n");
        assert!(matches!(
            result,
            Err(FnHostError::HardValidation(HardValidationError::InvalidPort { .. }))
        ));
    }

    #[test]
    fn test_invalid_target_name() {
        let result = ConfigLoader::load_string("host:\n  target: \"9-lives\"\n");
        assert!(matches!(
            result,
            Err(FnHostError::HardValidation(
                HardValidationError::InvalidFieldValue { field: "target", .. }
            ))
        ));
    }

    #[test]
    fn test_unknown_signature_type() {
        let result = ConfigLoader::load_string("host:\n  signature_type: rpc\n");
        assert!(matches!(
            result,
            Err(FnHostError::HardValidation(
                HardValidationError::UnknownSignatureType { .. }
            ))
        ));
    }

    #[test]
    fn test_metrics_port_clash() {
        let result = ConfigLoader::load_string("host:\n  port: 8080\n  metrics_port: 8080\n");
        assert!(matches!(
            result,
            Err(FnHostError::HardValidation(HardValidationError::InvalidPort { port: 8080, .. }))
        ));

        let mut config = ConfigLoader::load_string("host:\n  metrics_port: 9090\n").unwrap();
        assert!(config.validate().is_ok());
        config.port = Port::new(9090).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result = ConfigLoader::load_string("host:\n  prot: 8080\n");
        assert!(matches!(result, Err(FnHostError::ConfigParse { .. })));
    }
}
