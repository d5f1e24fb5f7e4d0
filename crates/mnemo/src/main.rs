// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mnemo - a retrieval-augmented companion agent with long-term memory.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use mnemo_config::{ConfigError, MnemoConfig};

/// Mnemo - a retrieval-augmented companion agent with long-term memory.
#[derive(Parser, Debug)]
#[command(name = "mnemo", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the WebSocket gateway and serve conversations.
    Serve,
    /// Condense one stored session into a long-term memory.
    Summarize {
        #[arg(long)]
        user: String,
        #[arg(long)]
        session: String,
    },
    /// Inspect configuration.
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Load and validate configuration, then report the result.
    Validate,
}

fn load(path: Option<&PathBuf>) -> Result<MnemoConfig, Vec<ConfigError>> {
    match path {
        Some(path) => mnemo_config::load_and_validate_path(path),
        None => mnemo_config::load_and_validate(),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load(cli.config.as_ref()) {
        Ok(config) => config,
        Err(errors) => {
            mnemo_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Some(Commands::Serve) => serve::run_serve(config).await,
        Some(Commands::Summarize { user, session }) => {
            match serve::run_summarize(config, &user, &session).await {
                Ok(memory) => {
                    println!("{memory}");
                    Ok(())
                }
                Err(e) => Err(e),
            }
        }
        Some(Commands::Config {
            action: ConfigCommands::Validate,
        }) => {
            println!(
                "mnemo: configuration is valid (agent.name={}, database={})",
                config.agent.name, config.storage.database_path
            );
            Ok(())
        }
        None => {
            println!("mnemo: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("mnemo: {e}");
        std::process::exit(1);
    }
}
