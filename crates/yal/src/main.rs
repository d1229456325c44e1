// SPDX-FileCopyrightText: 2026 Yal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Yal - a text generation chat bot.
//!
//! This is the binary entry point: configuration checks, an interactive
//! console front end, and an inspector for persisted interactive elements.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod elements;
mod shell;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::Colorize;
use yal_config::YalConfig;

/// Yal - a text generation chat bot.
#[derive(Parser, Debug)]
#[command(name = "yal", version, about, long_about = None)]
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
    /// Drive the bot from an interactive console.
    Shell,
    /// List persisted interactive elements.
    Elements {
        /// Include elements older than the reload window.
        #[arg(long)]
        all: bool,
    },
    /// Inspect configuration.
    Config {
        #[command(subcommand)]
        action: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Validate configuration and exit.
    Check,
    /// Print the effective configuration as TOML.
    Show,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => yal_config::load_and_validate_path(path),
        None => yal_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            yal_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.bot.log_level);

    let result = match cli.command {
        Some(Commands::Shell) => shell::run_shell(config).await,
        Some(Commands::Elements { all }) => elements::run_elements(&config, all).await,
        Some(Commands::Config { action }) => {
            run_config(&config, action);
            Ok(())
        }
        None => {
            println!("yal: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {e}", "error".red());
        std::process::exit(1);
    }
}

fn run_config(config: &YalConfig, action: ConfigCommand) {
    match action {
        ConfigCommand::Check => {
            println!(
                "{} (bot.name={}, queue.mode={:?})",
                "config ok".green(),
                config.bot.name,
                config.queue.mode
            );
        }
        ConfigCommand::Show => match toml::to_string_pretty(config) {
            Ok(text) => print!("{text}"),
            Err(e) => eprintln!("{}: failed to render config: {e}", "error".red()),
        },
    }
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("yal={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();
}
