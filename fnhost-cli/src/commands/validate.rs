// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `fnhost validate` command - Validate configuration file.

use fnhost_core::ConfigLoader;

pub async fn execute(file: &str) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(file = %file, "Validating configuration");

    match ConfigLoader::load_file(file) {
        Ok(config) => {
            println!("✓ Configuration is valid");
            println!();
            println!("Host Settings:");
            println!("  Port:           {}", config.port);
            println!(
                "  Target:         {}",
                config
                    .target
                    .as_ref()
                    .map(|t| t.as_str())
                    .unwrap_or("(none)")
            );
            println!(
                "  Signature Type: {}",
                config
                    .signature_type
                    .map(|s| s.name())
                    .unwrap_or("(any)")
            );
            match config.metrics_port {
                Some(port) => println!("  Metrics Port:   {}", port),
                None => println!("  Metrics Port:   (disabled)"),
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("✗ Configuration validation failed:");
            eprintln!("  {}", e);
            std::process::exit(1);
        }
    }
}
