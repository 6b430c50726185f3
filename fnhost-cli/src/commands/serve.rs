// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `fnhost serve` command - Start the HTTP host.
//!
//! Builds the registry once, then serves it read-only.

use fnhost_core::{
    ConfigLoader, FnHostError, FunctionName, FunctionRegistry, HostConfig, Port, SignatureType,
};

use crate::{functions, gateway, metrics};

/// Command-line values that take precedence over the config file.
#[derive(Debug, Default)]
pub struct Overrides {
    pub port: Option<u16>,
    pub target: Option<String>,
    pub signature_type: Option<SignatureType>,
}

/// Merge the config file (or defaults) with command-line overrides.
pub fn resolve_config(
    config_path: Option<&str>,
    overrides: Overrides,
) -> Result<HostConfig, FnHostError> {
    let mut config = match config_path {
        Some(path) => ConfigLoader::load_file(path)?,
        None => HostConfig::default(),
    };

    if let Some(port) = overrides.port {
        config.port = Port::new(port)?;
    }
    if let Some(target) = overrides.target {
        config.target = Some(FunctionName::new(target)?);
    }
    if let Some(signature_type) = overrides.signature_type {
        config.signature_type = Some(signature_type);
    }

    // Overrides can reintroduce a port clash the loader already rejected
    config.validate()?;
    Ok(config)
}

/// Check the configured target against the registry.
///
/// A missing target is fatal. A signature mismatch is only logged: the
/// signature the function was registered with is the one used.
pub fn check_target(registry: &FunctionRegistry, config: &HostConfig) -> Result<(), FnHostError> {
    let Some(target) = &config.target else {
        return Ok(());
    };

    let entry = registry
        .get_registered_function(target.as_str())
        .ok_or_else(|| FnHostError::FunctionNotFound(target.to_string()))?;

    if let Some(expected) = config.signature_type {
        if expected != entry.signature_type {
            tracing::warn!(
                function = %target,
                configured = %expected,
                registered = %entry.signature_type,
                "Configured signature type differs from registration, using registered type"
            );
        }
    }

    Ok(())
}

pub async fn execute(
    config_path: Option<&str>,
    overrides: Overrides,
) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(config = ?config_path, "Starting function host");

    // Load and validate configuration - fail fast on invalid config
    let config = resolve_config(config_path, overrides)?;

    // Registration happens here, before any request is served
    let registry = FunctionRegistry::new_shared();
    functions::register_all(&registry)?;
    check_target(&registry, &config)?;

    tracing::info!(
        functions = registry.len(),
        port = %config.port,
        target = ?config.target.as_ref().map(|t| t.as_str()),
        "Functions registered"
    );

    if let Some(metrics_port) = config.metrics_port {
        metrics::start_metrics_server(metrics_port.value());
    }

    gateway::start_gateway(config.port.value(), registry, config.target.clone())
        .await
        .map_err(|e| -> Box<dyn std::error::Error> { e })?;

    tracing::info!("Shutting down function host");
    Ok(())
}
