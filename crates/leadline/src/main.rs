// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Leadline - SMS intake CRM.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod reset;
mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use leadline_config::LeadlineConfig;

/// Leadline - qualify inbound SMS leads and check service availability.
#[derive(Parser, Debug)]
#[command(name = "leadline", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the webhook and agent API server.
    Serve,
    /// Load and validate configuration, then exit.
    CheckConfig,
    /// Delete all conversations, messages and availability checks.
    Reset {
        /// Also clear stored customer addresses.
        #[arg(long)]
        clear_addresses: bool,
    },
}

fn load_config(path: Option<&PathBuf>) -> LeadlineConfig {
    let loaded = match path {
        Some(path) => leadline_config::load_and_validate_path(path),
        None => leadline_config::load_and_validate(),
    };
    match loaded {
        Ok(config) => config,
        Err(errors) => {
            leadline_config::render_errors(&errors);
            std::process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref());

    let result = match cli.command {
        Some(Commands::Serve) => serve::run_serve(config).await,
        Some(Commands::CheckConfig) => {
            println!(
                "leadline: config ok (sms.provider={:?}, intake.decider={:?}, listening on {}:{})",
                config.sms.provider, config.intake.decider, config.gateway.host, config.gateway.port
            );
            Ok(())
        }
        Some(Commands::Reset { clear_addresses }) => {
            reset::run_reset(&config, clear_addresses).await
        }
        None => {
            println!("leadline: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
