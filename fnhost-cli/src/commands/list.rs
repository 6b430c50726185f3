// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `fnhost list` command - List registered functions.

use fnhost_core::FunctionRegistry;

use crate::functions;

pub async fn execute() -> Result<(), Box<dyn std::error::Error>> {
    let registry = FunctionRegistry::new();
    functions::register_all(&registry)?;

    if registry.is_empty() {
        println!("No functions registered.");
        return Ok(());
    }

    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                    REGISTERED FUNCTIONS                      ║");
    println!("╠════════════════════════════════════════╦═════════════════════╣");
    println!("║ Name                                   ║ Signature           ║");
    println!("╠════════════════════════════════════════╬═════════════════════╣");

    for (name, signature_type) in registry.signatures() {
        println!(
            "║ {:<38} ║ {:<19} ║",
            name.as_str(),
            signature_type.name()
        );
    }

    println!("╚════════════════════════════════════════╩═════════════════════╝");
    println!();
    println!("Total: {} function(s)", registry.len());

    Ok(())
}
