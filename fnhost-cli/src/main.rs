// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! fnhost CLI
//!
//! Command-line interface for the fnhost function host.

use clap::{Parser, Subcommand};
use fnhost_core::SignatureType;

mod commands;
mod functions;
mod gateway;
mod metrics;

/// fnhost - Serve registered functions over HTTP
#[derive(Parser)]
#[command(name = "fnhost")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP host
    Serve {
        /// Port to listen on (overrides the config file)
        #[arg(short, long, env = "PORT")]
        port: Option<u16>,

        /// Function served at every path outside /function/{name}
        #[arg(short, long, env = "FUNCTION_TARGET")]
        target: Option<String>,

        /// Expected signature of the target function
        #[arg(short, long, env = "FUNCTION_SIGNATURE_TYPE")]
        signature_type: Option<SignatureType>,
    },

    /// List registered functions
    List,

    /// Validate a configuration file
    Validate {
        /// Path to the configuration file
        file: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt().with_env_filter(log_level).init();

    // Dispatch to command handlers
    match cli.command {
        Commands::Serve {
            port,
            target,
            signature_type,
        } => {
            let overrides = commands::serve::Overrides {
                port,
                target,
                signature_type,
            };
            commands::serve::execute(cli.config.as_deref(), overrides).await
        }
        Commands::List => commands::list::execute().await,
        Commands::Validate { file } => commands::validate::execute(&file).await,
    }
}
